//! Service-account identity posted to the token endpoint

use common::Secret;
use common::config::Lookup;
use serde::Serialize;

/// Registration fields identifying this service to the evaluation API.
///
/// Missing fields are omitted from the auth payload rather than sent empty;
/// the token endpoint decides whether the remaining fields are sufficient.
#[derive(Debug, Clone, Default)]
pub struct Identity {
    pub email: Option<String>,
    pub name: Option<String>,
    pub roll_no: Option<String>,
    pub access_code: Option<Secret<String>>,
    pub client_id: Option<String>,
    pub client_secret: Option<Secret<String>>,
}

/// Wire shape of the `POST /auth` body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AuthRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    roll_no: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    access_code: Option<&'a str>,
    #[serde(rename = "clientID", skip_serializing_if = "Option::is_none")]
    client_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    client_secret: Option<&'a str>,
}

impl Identity {
    /// Read `EMAIL`, `NAME`, `ROLL_NO`, `ACCESS_CODE`, `CLIENT_ID` and
    /// `CLIENT_SECRET`.
    pub fn from_lookup(lookup: Lookup<'_>) -> Self {
        Self {
            email: lookup("EMAIL"),
            name: lookup("NAME"),
            roll_no: lookup("ROLL_NO"),
            access_code: lookup("ACCESS_CODE").map(Secret::new),
            client_id: lookup("CLIENT_ID"),
            client_secret: lookup("CLIENT_SECRET").map(Secret::new),
        }
    }

    /// Whether every registration field is present.
    pub fn is_complete(&self) -> bool {
        self.email.is_some()
            && self.name.is_some()
            && self.roll_no.is_some()
            && self.access_code.is_some()
            && self.client_id.is_some()
            && self.client_secret.is_some()
    }

    pub(crate) fn auth_request(&self) -> AuthRequest<'_> {
        AuthRequest {
            email: self.email.as_deref(),
            name: self.name.as_deref(),
            roll_no: self.roll_no.as_deref(),
            access_code: self.access_code.as_ref().map(|s| s.expose().as_str()),
            client_id: self.client_id.as_deref(),
            client_secret: self.client_secret.as_ref().map(|s| s.expose().as_str()),
        }
    }
}
