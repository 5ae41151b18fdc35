//! Request description handed to the executor.

use bytes::Bytes;
use serde::Serialize;

use crate::error::{Error, ErrorKind, Result};

/// HTTP request method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestMethod {
    Get,
    Post,
    Delete,
}

impl RequestMethod {
    /// Convert to reqwest::Method.
    pub fn to_reqwest(&self) -> reqwest::Method {
        match self {
            RequestMethod::Get => reqwest::Method::GET,
            RequestMethod::Post => reqwest::Method::POST,
            RequestMethod::Delete => reqwest::Method::DELETE,
        }
    }

    /// Upper-case method name as used in the signature base string.
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestMethod::Get => "GET",
            RequestMethod::Post => "POST",
            RequestMethod::Delete => "DELETE",
        }
    }
}

/// One part of a multipart body.
#[derive(Debug, Clone)]
pub struct MultipartPart {
    pub(crate) name: String,
    pub(crate) file_name: Option<String>,
    pub(crate) content_type: Option<String>,
    pub(crate) data: Bytes,
}

impl MultipartPart {
    /// Create a part with the given field name and content.
    pub fn new(name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            file_name: None,
            content_type: None,
            data: data.into(),
        }
    }

    /// Create a plain text field.
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(name, Bytes::from(value.into()))
    }

    /// Set the file name sent with the part.
    pub fn file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }

    /// Set the part's content type.
    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub(crate) fn to_reqwest(&self) -> Result<reqwest::multipart::Part> {
        let mut part = reqwest::multipart::Part::bytes(self.data.to_vec());
        if let Some(ref file_name) = self.file_name {
            part = part.file_name(file_name.clone());
        }
        if let Some(ref content_type) = self.content_type {
            part = part.mime_str(content_type).map_err(|e| {
                Error::with_source(
                    ErrorKind::Configuration(format!("Invalid content type: {}", content_type)),
                    e,
                )
            })?;
        }
        Ok(part)
    }
}

/// Request body content.
#[derive(Debug, Clone)]
pub enum RequestBody {
    /// `application/x-www-form-urlencoded`; the parameters are signed.
    Form(Vec<(String, String)>),
    /// Raw body with its content type; not part of the signature.
    Raw { data: Bytes, content_type: String },
    /// `multipart/form-data`; not part of the signature.
    Multipart(Vec<MultipartPart>),
}

/// Builder for a request against a path relative to the executor's base URL.
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    pub(crate) method: RequestMethod,
    pub(crate) path: String,
    pub(crate) headers: Vec<(String, String)>,
    pub(crate) query_params: Vec<(String, String)>,
    pub(crate) protocol_params: Vec<(String, String)>,
    pub(crate) body: Option<RequestBody>,
}

impl RequestBuilder {
    /// Create a new request builder.
    pub fn new(method: RequestMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: Vec::new(),
            query_params: Vec::new(),
            protocol_params: Vec::new(),
            body: None,
        }
    }

    /// Create a GET request builder.
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(RequestMethod::Get, path)
    }

    /// Create a POST request builder.
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(RequestMethod::Post, path)
    }

    /// Create a DELETE request builder.
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(RequestMethod::Delete, path)
    }

    /// The request method.
    pub fn method(&self) -> RequestMethod {
        self.method
    }

    /// The relative (or absolute) path of the request.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Add a header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Add a query parameter.
    pub fn query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query_params.push((name.into(), value.into()));
        self
    }

    /// Add several query parameters.
    pub fn query_pairs<K, V>(mut self, pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.query_params
            .extend(pairs.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Add an `oauth_*` protocol parameter (e.g. `oauth_callback`,
    /// `oauth_verifier`) that is signed and sent in the Authorization header.
    pub fn oauth_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.protocol_params.push((name.into(), value.into()));
        self
    }

    /// Set a url-encoded form body.
    pub fn form<K, V>(mut self, params: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.body = Some(RequestBody::Form(
            params
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        ));
        self
    }

    /// Set a raw body.
    pub fn body(mut self, data: impl Into<Bytes>, content_type: impl Into<String>) -> Self {
        self.body = Some(RequestBody::Raw {
            data: data.into(),
            content_type: content_type.into(),
        });
        self
    }

    /// Set a JSON body.
    pub fn json<T: Serialize>(self, body: &T) -> Result<Self> {
        let data = serde_json::to_vec(body).map_err(|e| {
            Error::with_source(ErrorKind::InvalidArgument(e.to_string()), e)
        })?;
        Ok(self.body(data, "application/json"))
    }

    /// Set a multipart body.
    pub fn multipart(mut self, parts: Vec<MultipartPart>) -> Self {
        self.body = Some(RequestBody::Multipart(parts));
        self
    }

    /// Form parameters that take part in the signature.
    pub(crate) fn signed_body_params(&self) -> &[(String, String)] {
        match self.body {
            Some(RequestBody::Form(ref params)) => params,
            _ => &[],
        }
    }
}
