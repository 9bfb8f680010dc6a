use super::filters::{FilterBuilder, LOCKED_STATUS_CODE};
use super::{
    GatewayError, InvitationApi, InviteError, InviteReceipt, InviteRequest, Invitee,
    LookupGateway, Principal, PrincipalQuery, PrincipalStatus, PrincipalType, Role,
};
use crate::shared::{MemberId, PrincipalId, RoleId};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

const API_PREFIX: &str = "api/v3";

/// Blocking client for the v3 principals, roles and memberships endpoints.
#[derive(Debug, Clone)]
pub struct ApiClient {
    api_base: String,
    api_key: Option<String>,
    page_size: u32,
}

#[derive(Debug, Clone, Deserialize)]
struct Collection<T> {
    #[serde(rename = "_embedded")]
    embedded: Embedded<T>,
}

#[derive(Debug, Clone, Deserialize)]
struct Embedded<T> {
    #[serde(default = "Vec::new")]
    elements: Vec<T>,
}

#[derive(Debug, Clone, Deserialize)]
struct PrincipalElement {
    #[serde(rename = "_type")]
    resource_type: String,
    id: PrincipalId,
    name: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    status: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct RoleElement {
    id: RoleId,
    name: String,
}

#[derive(Debug, Clone, Deserialize)]
struct MembershipElement {
    id: MemberId,
    #[serde(rename = "_links", default)]
    links: Value,
}

impl ApiClient {
    pub fn new(api_base: &str, api_key: Option<String>, page_size: u32) -> Self {
        Self {
            api_base: api_base.trim_end_matches('/').to_string(),
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            page_size,
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}/{}", self.api_base, API_PREFIX, path)
    }

    fn authorize(&self, request: ureq::Request) -> ureq::Request {
        match &self.api_key {
            Some(key) => request.set("Authorization", &format!("Bearer {key}")),
            None => request,
        }
    }

    fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, GatewayError> {
        let mut url = self.endpoint(path);
        if !query.is_empty() {
            let encoded = query
                .iter()
                .map(|(k, v)| format!("{k}={}", urlencoding::encode(v)))
                .collect::<Vec<_>>()
                .join("&");
            url = format!("{url}?{encoded}");
        }

        let response = self
            .authorize(ureq::get(&url))
            .set("Accept", "application/hal+json")
            .call()
            .map_err(|err| match err {
                ureq::Error::Status(status, response) => GatewayError::Response {
                    status,
                    message: error_message_from_body(
                        &response.into_json::<Value>().unwrap_or(Value::Null),
                    ),
                },
                ureq::Error::Transport(transport) => GatewayError::Request(transport.to_string()),
            })?;

        response
            .into_json::<T>()
            .map_err(|e| GatewayError::Decode(e.to_string()))
    }
}

impl LookupGateway for ApiClient {
    fn principals(&self, query: &PrincipalQuery) -> Result<Vec<Principal>, GatewayError> {
        let filters = principal_filters(query);
        let collection: Collection<PrincipalElement> = self.get_json(
            "principals",
            &[
                ("filters", filters.to_json_string()),
                ("pageSize", self.page_size.to_string()),
            ],
        )?;
        Ok(collection
            .embedded
            .elements
            .into_iter()
            .filter_map(principal_from_element)
            .filter(|principal| principal.kind == query.principal_type)
            .filter(|principal| principal.status.is_selectable())
            .collect())
    }

    fn roles(&self, term: &str) -> Result<Vec<Role>, GatewayError> {
        // The roles endpoint cannot filter by name, so matching happens client-side.
        let filters = FilterBuilder::new().add("grantable", "=", &["t"]);
        let collection: Collection<RoleElement> = self.get_json(
            "roles",
            &[
                ("filters", filters.to_json_string()),
                ("pageSize", self.page_size.to_string()),
            ],
        )?;
        Ok(collection
            .embedded
            .elements
            .into_iter()
            .map(|element| Role {
                id: element.id,
                name: element.name,
            })
            .filter(|role| name_matches(&role.name, term))
            .collect())
    }
}

impl InvitationApi for ApiClient {
    fn invite(&self, request: &InviteRequest) -> Result<InviteReceipt, InviteError> {
        let body = membership_body(request)?;
        let url = self.endpoint("memberships");
        let response = self
            .authorize(ureq::post(&url))
            .set("Accept", "application/hal+json")
            .send_json(body);

        match response {
            Ok(response) => {
                let membership = response
                    .into_json::<MembershipElement>()
                    .map_err(|e| InviteError::Transport(e.to_string()))?;
                let principal_name = membership
                    .links
                    .pointer("/principal/title")
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .unwrap_or_else(|| {
                        request
                            .invitee
                            .as_ref()
                            .map(Invitee::describe)
                            .unwrap_or_default()
                    });
                Ok(InviteReceipt {
                    member_id: membership.id,
                    principal_name,
                })
            }
            Err(ureq::Error::Status(status, response)) => {
                let body = response.into_json::<Value>().unwrap_or(Value::Null);
                Err(invite_error_from_body(status, &body, request))
            }
            Err(ureq::Error::Transport(transport)) => {
                Err(InviteError::Transport(transport.to_string()))
            }
        }
    }
}

pub(crate) fn principal_filters(query: &PrincipalQuery) -> FilterBuilder {
    let mut filters = FilterBuilder::new();
    if !query.term.trim().is_empty() {
        filters = filters.add("name", "~", &[query.term.trim()]);
    }
    filters
        .add("status", "!", &[LOCKED_STATUS_CODE])
        .add("type", "=", &[query.principal_type.api_type_name()])
}

fn principal_from_element(element: PrincipalElement) -> Option<Principal> {
    let kind = PrincipalType::from_api_type_name(&element.resource_type)?;
    let status = match element.status.as_deref() {
        Some("locked") => PrincipalStatus::Locked,
        Some("registered") => PrincipalStatus::Registered,
        Some("invited") => PrincipalStatus::Invited,
        _ => PrincipalStatus::Active,
    };
    Some(Principal {
        id: element.id,
        name: element.name,
        email: element.email.filter(|email| !email.trim().is_empty()),
        kind,
        status,
    })
}

pub(crate) fn name_matches(name: &str, term: &str) -> bool {
    let term = term.trim();
    term.is_empty() || name.to_lowercase().contains(&term.to_lowercase())
}

pub(crate) fn membership_body(request: &InviteRequest) -> Result<Value, InviteError> {
    let invitee = request
        .invitee
        .as_ref()
        .ok_or(InviteError::MissingAnswer("principal"))?;
    let role_id = request
        .role_id
        .as_ref()
        .ok_or(InviteError::MissingAnswer("role"))?;

    let mut body = json!({
        "_links": {
            "project": { "href": format!("/{API_PREFIX}/projects/{}", request.project_id) },
            "roles": [ { "href": format!("/{API_PREFIX}/roles/{role_id}") } ],
        },
        "_meta": {
            "notificationMessage": { "raw": request.message },
        },
    });
    match invitee {
        Invitee::Principal { id, kind } => {
            body["_links"]["principal"] =
                json!({ "href": format!("/{API_PREFIX}/{}/{id}", kind.api_collection()) });
        }
        Invitee::Email(email) => {
            body["email"] = json!(email);
        }
    }
    Ok(body)
}

fn error_message_from_body(body: &Value) -> String {
    body.get("message")
        .and_then(Value::as_str)
        .unwrap_or("request failed")
        .to_string()
}

/// Maps an API error document onto the structured invite failures.
///
/// A `MultipleErrors` document carries its individual errors under
/// `_embedded.errors`; every other document is a single error.
pub(crate) fn invite_error_from_body(
    status: u16,
    body: &Value,
    request: &InviteRequest,
) -> InviteError {
    let errors: Vec<&Value> = match body.pointer("/_embedded/errors").and_then(Value::as_array) {
        Some(errors) => errors.iter().collect(),
        None => vec![body],
    };

    let mut messages = Vec::new();
    for error in errors {
        let attribute = error
            .pointer("/_embedded/details/attribute")
            .and_then(Value::as_str)
            .unwrap_or_default();
        let message = error_message_from_body(error);
        match attribute {
            "user" | "principal" if message.contains("taken") => {
                return InviteError::AlreadyMember {
                    principal: request
                        .invitee
                        .as_ref()
                        .map(Invitee::describe)
                        .unwrap_or_default(),
                };
            }
            "roles" => {
                return InviteError::RoleNotPermitted {
                    role: request
                        .role_id
                        .as_ref()
                        .map(|id| id.to_string())
                        .unwrap_or_default(),
                };
            }
            _ => messages.push(message),
        }
    }

    if status >= 500 {
        return InviteError::Transport(format!("http {status}: {}", messages.join("; ")));
    }
    InviteError::Rejected(messages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::ProjectId;

    fn request(invitee: Option<Invitee>) -> InviteRequest {
        InviteRequest {
            project_id: ProjectId::parse("7").expect("project"),
            invitee,
            role_id: Some(RoleId::parse("3").expect("role")),
            message: "welcome".to_string(),
        }
    }

    fn user_invitee() -> Invitee {
        Invitee::Principal {
            id: PrincipalId::parse("12").expect("principal"),
            kind: PrincipalType::User,
        }
    }

    #[test]
    fn principal_filters_skip_blank_terms() {
        let query = PrincipalQuery {
            term: "  ".to_string(),
            project_id: ProjectId::parse("7").expect("project"),
            principal_type: PrincipalType::Group,
        };
        let parsed: Value =
            serde_json::from_str(&principal_filters(&query).to_json_string()).expect("json");
        let filters = parsed.as_array().expect("array");
        assert_eq!(filters.len(), 2);
        assert_eq!(filters[1]["type"]["values"][0], "Group");
    }

    #[test]
    fn membership_body_links_principal_by_collection() {
        let body = membership_body(&request(Some(user_invitee()))).expect("body");
        assert_eq!(body["_links"]["principal"]["href"], "/api/v3/users/12");
        assert_eq!(body["_links"]["project"]["href"], "/api/v3/projects/7");
        assert_eq!(body["_links"]["roles"][0]["href"], "/api/v3/roles/3");
        assert_eq!(body["_meta"]["notificationMessage"]["raw"], "welcome");
    }

    #[test]
    fn membership_body_sends_email_instead_of_principal_link() {
        let body = membership_body(&request(Some(Invitee::Email("new@example.com".into()))))
            .expect("body");
        assert_eq!(body["email"], "new@example.com");
        assert!(body["_links"].get("principal").is_none());
    }

    #[test]
    fn membership_body_requires_principal() {
        assert_eq!(
            membership_body(&request(None)).expect_err("missing principal"),
            InviteError::MissingAnswer("principal")
        );
    }

    #[test]
    fn taken_principal_maps_to_already_member() {
        let body = json!({
            "_type": "Error",
            "message": "User has already been taken.",
            "_embedded": { "details": { "attribute": "user" } },
        });
        let err = invite_error_from_body(422, &body, &request(Some(user_invitee())));
        assert_eq!(
            err,
            InviteError::AlreadyMember {
                principal: "user 12".to_string()
            }
        );
    }

    #[test]
    fn multiple_errors_collect_messages_and_detect_roles() {
        let body = json!({
            "_type": "Error",
            "errorIdentifier": "urn:openproject-org:api:v3:errors:MultipleErrors",
            "_embedded": { "errors": [
                { "message": "Message is too long.", "_embedded": { "details": { "attribute": "message" } } },
                { "message": "Roles is invalid.", "_embedded": { "details": { "attribute": "roles" } } },
            ]},
        });
        let err = invite_error_from_body(422, &body, &request(Some(user_invitee())));
        assert_eq!(
            err,
            InviteError::RoleNotPermitted {
                role: "3".to_string()
            }
        );

        let body = json!({ "message": "Project is archived." });
        let err = invite_error_from_body(422, &body, &request(Some(user_invitee())));
        assert_eq!(err, InviteError::Rejected(vec!["Project is archived.".to_string()]));
    }

    #[test]
    fn principal_elements_map_status_and_type() {
        let element: PrincipalElement = serde_json::from_value(json!({
            "_type": "PlaceholderUser",
            "id": 9,
            "name": "Designer TBD",
        }))
        .expect("element");
        let principal = principal_from_element(element).expect("principal");
        assert_eq!(principal.kind, PrincipalType::Placeholder);
        assert_eq!(principal.status, PrincipalStatus::Active);

        let element: PrincipalElement = serde_json::from_value(json!({
            "_type": "Role",
            "id": 1,
            "name": "Member",
        }))
        .expect("element");
        assert!(principal_from_element(element).is_none());
    }
}
