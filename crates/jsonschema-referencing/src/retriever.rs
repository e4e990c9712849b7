use core::fmt;

use url::Url;

/// Fetches the raw bytes of an external document that is not present in a registry.
pub trait Retrieve: Send + Sync {
    /// Retrieve the document identified by `uri`.
    ///
    /// # Errors
    ///
    /// If the document can not be fetched.
    fn retrieve(&self, uri: &Url) -> Result<Vec<u8>, Box<dyn std::error::Error + Send + Sync>>;
}

impl<F> Retrieve for F
where
    F: Fn(&Url) -> Result<Vec<u8>, Box<dyn std::error::Error + Send + Sync>> + Send + Sync,
{
    fn retrieve(&self, uri: &Url) -> Result<Vec<u8>, Box<dyn std::error::Error + Send + Sync>> {
        self(uri)
    }
}

#[derive(Debug)]
struct NoRetrieverConfigured(String);

impl fmt::Display for NoRetrieverConfigured {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_fmt(format_args!(
            "No loader is configured for the '{}' scheme",
            self.0
        ))
    }
}

impl std::error::Error for NoRetrieverConfigured {}

/// A retriever that never fetches anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultRetriever;

impl Retrieve for DefaultRetriever {
    fn retrieve(&self, uri: &Url) -> Result<Vec<u8>, Box<dyn std::error::Error + Send + Sync>> {
        Err(Box::new(NoRetrieverConfigured(uri.scheme().to_string())))
    }
}
