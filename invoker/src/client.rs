use crate::Error;
use http::{uri::Scheme, Request, Response, Uri};
use hyper::{client::HttpConnector, Body};

#[derive(Debug)]
pub(crate) struct Client {
    pub(crate) base: Uri,
    pub(crate) client: hyper::Client<HttpConnector>,
}

impl Client {
    pub fn new(base: Uri) -> Self {
        Self {
            base,
            client: hyper::Client::new(),
        }
    }

    fn set_origin(&self, req: Request<Body>) -> Result<Request<Body>, Error> {
        let (mut parts, body) = req.into_parts();
        let scheme = self.base.scheme().unwrap_or(&Scheme::HTTP);
        let authority = self
            .base
            .authority()
            .ok_or_else(|| format!("runtime endpoint {} has no authority", self.base))?;
        let path = parts
            .uri
            .path_and_query()
            .ok_or_else(|| format!("request uri {} has no path", parts.uri))?;

        let uri = Uri::builder()
            .scheme(scheme.clone())
            .authority(authority.clone())
            .path_and_query(path.clone())
            .build()?;

        parts.uri = uri;
        Ok(Request::from_parts(parts, body))
    }

    pub(crate) async fn call(&self, req: Request<Body>) -> Result<Response<Body>, Error> {
        let req = self.set_origin(req)?;
        let response = self.client.request(req).await?;
        Ok(response)
    }
}

/// Parse the `FN_RUNTIME_API` value, which hosts usually give as a bare `host:port`.
pub(crate) fn endpoint_uri(endpoint: &str) -> Result<Uri, Error> {
    let uri = if endpoint.contains("://") {
        endpoint.parse::<Uri>()?
    } else {
        format!("http://{}", endpoint).parse::<Uri>()?
    };
    Ok(uri)
}
