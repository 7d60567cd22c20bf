//! Request and response types for the HTTP-facing layer.
//!
//! Requests are plain serde structs. Each one is validated into borrowed
//! arguments before [`FriendGraph`] is called, so the graph core only
//! ever sees well-formed email addresses. Failures of any kind come back
//! as an [`ApiError`] carrying a status code and a `{ success, message }`
//! body.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::email::is_email;
use crate::graph::{FriendGraph, GraphError, RelationshipStore};

/// Body of every failed response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Always `false`.
    pub success: bool,
    /// Human-readable reason.
    pub message: String,
}

/// A failed request: status code plus body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    /// Status code for the response.
    pub status: u16,
    /// Response body.
    pub body: ErrorResponse,
}

impl ApiError {
    /// Builds a 400 response with `message`.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: 400,
            body: ErrorResponse {
                success: false,
                message: message.into(),
            },
        }
    }
}

impl From<GraphError> for ApiError {
    fn from(err: GraphError) -> Self {
        Self {
            status: err.kind().status_code(),
            body: ErrorResponse {
                success: false,
                message: err.to_string(),
            },
        }
    }
}

/// Result type for API calls.
pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Parses a JSON request body.
///
/// # Errors
///
/// Returns a 400 [`ApiError`] if the body does not match the schema.
pub fn parse_request<T: DeserializeOwned>(body: &str) -> ApiResult<T> {
    serde_json::from_str(body).map_err(|e| ApiError::bad_request(format!("Malformed request: {e}")))
}

// ==================== Requests ====================

/// Body of `connect`: exactly two emails.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectRequest {
    /// The two users to connect.
    pub friends: Option<Vec<String>>,
}

/// Body of `common friends`: exactly two emails.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommonFriendsRequest {
    /// The two users to compare.
    pub friends: Option<Vec<String>>,
}

/// Body of `connections`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionsRequest {
    /// Whose friends to list.
    pub email: Option<String>,
}

/// Body of `subscribe` and `block`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipRequest {
    /// User creating the edge.
    pub requestor: Option<String>,
    /// User the edge points at.
    pub target: Option<String>,
}

/// Body of `update`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateRequest {
    /// Author of the update.
    pub sender: Option<String>,
    /// Update text, scanned for mentions.
    pub text: Option<String>,
}

fn pair_of_emails<'a>(
    friends: Option<&'a [String]>,
    missing: &str,
) -> ApiResult<(&'a str, &'a str)> {
    let friends = friends.ok_or_else(|| ApiError::bad_request(missing))?;

    let [a, b] = friends else {
        return Err(ApiError::bad_request(
            "We only allow 2 friends to be connected each time",
        ));
    };

    if !is_email(a) || !is_email(b) {
        return Err(ApiError::bad_request(
            "Friends must be valid email addresses",
        ));
    }

    Ok((a.as_str(), b.as_str()))
}

fn required_email<'a>(value: Option<&'a String>, message: &str) -> ApiResult<&'a str> {
    match value {
        Some(email) if is_email(email) => Ok(email.as_str()),
        _ => Err(ApiError::bad_request(message)),
    }
}

impl ConnectRequest {
    /// Validates the request into the two emails to connect.
    ///
    /// # Errors
    ///
    /// Returns a 400 [`ApiError`] if the list is missing, does not hold
    /// exactly two entries, or holds an invalid address.
    pub fn validate(&self) -> ApiResult<(&str, &str)> {
        pair_of_emails(
            self.friends.as_deref(),
            "An array of friends must be specified to be connected",
        )
    }
}

impl CommonFriendsRequest {
    /// Validates the request into the two emails to compare.
    ///
    /// # Errors
    ///
    /// Returns a 400 [`ApiError`] on a missing or malformed list.
    pub fn validate(&self) -> ApiResult<(&str, &str)> {
        pair_of_emails(
            self.friends.as_deref(),
            "An array of friends must be specified to find common friends",
        )
    }
}

impl ConnectionsRequest {
    /// Validates the request into the subject email.
    ///
    /// # Errors
    ///
    /// Returns a 400 [`ApiError`] if the email is missing or invalid.
    pub fn validate(&self) -> ApiResult<&str> {
        required_email(self.email.as_ref(), "Please specify an email address")
    }
}

impl RelationshipRequest {
    /// Validates the request into `(requestor, target)`.
    ///
    /// # Errors
    ///
    /// Returns a 400 [`ApiError`] naming the first missing or invalid field.
    pub fn validate(&self) -> ApiResult<(&str, &str)> {
        let requestor = required_email(
            self.requestor.as_ref(),
            "Requestor must specified and must be a valid email address",
        )?;
        let target = required_email(
            self.target.as_ref(),
            "Target must specified and must be a valid email address",
        )?;
        Ok((requestor, target))
    }
}

impl UpdateRequest {
    /// Validates the request into `(sender, text)`.
    ///
    /// # Errors
    ///
    /// Returns a 400 [`ApiError`] naming the first missing or invalid field.
    pub fn validate(&self) -> ApiResult<(&str, &str)> {
        let sender = required_email(
            self.sender.as_ref(),
            "Sender must specified and must be a valid email address",
        )?;
        let text = self
            .text
            .as_deref()
            .ok_or_else(|| ApiError::bad_request("Text to send must specified and must be a string"))?;
        Ok((sender, text))
    }
}

// ==================== Responses ====================

/// Body of a successful call with no payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuccessResponse {
    /// Always `true`.
    pub success: bool,
}

/// Body of `connections` and `common friends`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FriendListResponse {
    /// Always `true`.
    pub success: bool,
    /// Friend emails.
    pub friends: Vec<String>,
    /// Number of entries in `friends`.
    pub count: usize,
}

/// Body of `update`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipientsResponse {
    /// Always `true`.
    pub success: bool,
    /// Deduplicated recipient emails.
    pub recipients: Vec<String>,
}

const OK: SuccessResponse = SuccessResponse { success: true };

impl FriendListResponse {
    fn new(friends: Vec<String>) -> Self {
        Self {
            success: true,
            count: friends.len(),
            friends,
        }
    }
}

// ==================== Handlers ====================

/// Validating front door over a [`FriendGraph`].
#[derive(Debug)]
pub struct FriendnetApi<S: RelationshipStore> {
    graph: FriendGraph<S>,
}

impl<S: RelationshipStore> FriendnetApi<S> {
    /// Wraps `graph`.
    #[must_use]
    pub const fn new(graph: FriendGraph<S>) -> Self {
        Self { graph }
    }

    /// Returns the wrapped graph.
    #[must_use]
    pub const fn graph(&self) -> &FriendGraph<S> {
        &self.graph
    }

    /// Connects two users.
    ///
    /// # Errors
    ///
    /// See [`ConnectRequest::validate`] and [`FriendGraph::connect`].
    pub fn connect(&self, request: &ConnectRequest) -> ApiResult<SuccessResponse> {
        let (a, b) = request.validate()?;
        self.graph.connect(a, b)?;
        Ok(OK)
    }

    /// Lists a user's friends.
    ///
    /// # Errors
    ///
    /// See [`ConnectionsRequest::validate`] and [`FriendGraph::connections`].
    pub fn connections(&self, request: &ConnectionsRequest) -> ApiResult<FriendListResponse> {
        let email = request.validate()?;
        Ok(FriendListResponse::new(self.graph.connections(email)?))
    }

    /// Lists the friends two users have in common.
    ///
    /// # Errors
    ///
    /// See [`CommonFriendsRequest::validate`] and [`FriendGraph::common_friends`].
    pub fn common_friends(
        &self,
        request: &CommonFriendsRequest,
    ) -> ApiResult<FriendListResponse> {
        let (a, b) = request.validate()?;
        Ok(FriendListResponse::new(self.graph.common_friends(a, b)?))
    }

    /// Subscribes the requestor to the target's updates.
    ///
    /// # Errors
    ///
    /// See [`RelationshipRequest::validate`] and [`FriendGraph::subscribe`].
    pub fn subscribe(&self, request: &RelationshipRequest) -> ApiResult<SuccessResponse> {
        let (requestor, target) = request.validate()?;
        self.graph.subscribe(requestor, target)?;
        Ok(OK)
    }

    /// Blocks the target on behalf of the requestor.
    ///
    /// # Errors
    ///
    /// See [`RelationshipRequest::validate`] and [`FriendGraph::block`].
    pub fn block(&self, request: &RelationshipRequest) -> ApiResult<SuccessResponse> {
        let (requestor, target) = request.validate()?;
        self.graph.block(requestor, target)?;
        Ok(OK)
    }

    /// Resolves the recipients of an update.
    ///
    /// # Errors
    ///
    /// See [`UpdateRequest::validate`] and [`FriendGraph::update`].
    pub fn update(&self, request: &UpdateRequest) -> ApiResult<RecipientsResponse> {
        let (sender, text) = request.validate()?;
        Ok(RecipientsResponse {
            success: true,
            recipients: self.graph.update(sender, text)?,
        })
    }
}
