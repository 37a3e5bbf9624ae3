//! Replayable request descriptions.
//!
//! A `reqwest::RequestBuilder` is consumed when sent and a multipart form
//! cannot be cloned, so the pipeline works with [`ApiRequest`] values
//! instead and builds a fresh `reqwest` request for every attempt.

use reqwest::multipart::{Form, Part};
use reqwest::{Method, Url};

use crate::error::ClientError;

/// One HTTP call against the backend, independent of any token.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub(crate) method: Method,
    pub(crate) segments: Vec<String>,
    pub(crate) query: Vec<(String, String)>,
    pub(crate) body: RequestBody,
    pub(crate) authenticated: bool,
    pub(crate) retried: bool,
}

#[derive(Debug, Clone)]
pub(crate) enum RequestBody {
    Empty,
    Json(serde_json::Value),
    Multipart(Vec<FormPart>),
}

/// A multipart field kept as owned data so the form can be rebuilt.
#[derive(Debug, Clone, PartialEq)]
pub enum FormPart {
    Text {
        name: String,
        value: String,
    },
    File {
        name: String,
        file_name: String,
        content_type: Option<String>,
        bytes: Vec<u8>,
    },
}

impl FormPart {
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        FormPart::Text {
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn file(
        name: impl Into<String>,
        file_name: impl Into<String>,
        content_type: Option<String>,
        bytes: Vec<u8>,
    ) -> Self {
        FormPart::File {
            name: name.into(),
            file_name: file_name.into(),
            content_type,
            bytes,
        }
    }
}

impl ApiRequest {
    /// Start a request for the path made of `segments`, each of which is
    /// percent-encoded on its own. Requests are authenticated by default.
    pub fn new<S: AsRef<str>>(method: Method, segments: &[S]) -> Self {
        Self {
            method,
            segments: segments.iter().map(|s| s.as_ref().to_owned()).collect(),
            query: Vec::new(),
            body: RequestBody::Empty,
            authenticated: true,
            retried: false,
        }
    }

    pub fn get<S: AsRef<str>>(segments: &[S]) -> Self {
        Self::new(Method::GET, segments)
    }

    pub fn post<S: AsRef<str>>(segments: &[S]) -> Self {
        Self::new(Method::POST, segments)
    }

    pub fn put<S: AsRef<str>>(segments: &[S]) -> Self {
        Self::new(Method::PUT, segments)
    }

    pub fn delete<S: AsRef<str>>(segments: &[S]) -> Self {
        Self::new(Method::DELETE, segments)
    }

    /// Send without an `Authorization` header and never hand a 401 to the
    /// refresh coordinator.
    pub fn public(mut self) -> Self {
        self.authenticated = false;
        self
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn query_pairs<K: Into<String>>(mut self, pairs: impl IntoIterator<Item = (K, String)>) -> Self {
        self.query
            .extend(pairs.into_iter().map(|(k, v)| (k.into(), v)));
        self
    }

    pub fn json(mut self, body: serde_json::Value) -> Self {
        self.body = RequestBody::Json(body);
        self
    }

    pub fn multipart(mut self, parts: Vec<FormPart>) -> Self {
        self.body = RequestBody::Multipart(parts);
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    /// True once this request has been replayed after a token refresh.
    pub fn is_retried(&self) -> bool {
        self.retried
    }

    pub(crate) fn mark_retried(&mut self) {
        self.retried = true;
    }

    /// Short `METHOD /a/b` label for log lines.
    pub fn label(&self) -> String {
        format!("{} /{}", self.method, self.segments.join("/"))
    }

    /// Resolve against `base`, appending the encoded path segments and the
    /// query pairs.
    pub(crate) fn url(&self, base: &Url) -> Result<Url, ClientError> {
        let mut url = base.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::Config(format!("API URL cannot be a base: {base}")))?
            .pop_if_empty()
            .extend(&self.segments);
        if !self.query.is_empty() {
            url.query_pairs_mut().extend_pairs(&self.query);
        }
        Ok(url)
    }

    /// Build a fresh `reqwest` request, bearing `token` when this request
    /// is authenticated.
    pub(crate) fn build(
        &self,
        http: &reqwest::Client,
        base: &Url,
        token: Option<&str>,
    ) -> Result<reqwest::RequestBuilder, ClientError> {
        let mut builder = http.request(self.method.clone(), self.url(base)?);

        if self.authenticated {
            if let Some(token) = token {
                builder = builder.bearer_auth(token);
            }
        }

        builder = match &self.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(value),
            RequestBody::Multipart(parts) => builder.multipart(build_form(parts)?),
        };

        Ok(builder)
    }
}

fn build_form(parts: &[FormPart]) -> Result<Form, ClientError> {
    let mut form = Form::new();
    for part in parts {
        form = match part {
            FormPart::Text { name, value } => form.text(name.clone(), value.clone()),
            FormPart::File {
                name,
                file_name,
                content_type,
                bytes,
            } => {
                let mut file = Part::bytes(bytes.clone()).file_name(file_name.clone());
                if let Some(mime) = content_type {
                    file = file.mime_str(mime)?;
                }
                form.part(name.clone(), file)
            }
        };
    }
    Ok(form)
}
