// SPDX-License-Identifier: MIT

//! Static endpoint registry.
//!
//! One table drives both request validation and route generation: each entry
//! names an endpoint, its query schema, the response shape, and whether the
//! caller must be authenticated. The table must correspond 1:1 with the
//! dispatcher's handlers; [`verify`] checks that at startup so a mismatch
//! aborts the process instead of surfacing per request.
//!
//! The `token` field used for authentication is intentionally absent from
//! query schemas: a missing token is an authentication failure (401), not a
//! validation failure (400).

use serde_json::Value;

/// Every dispatchable endpoint. The dispatcher matches exhaustively on this
/// enum, which keeps the handler set and the registry in lockstep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    CreateAccount,
    SignIn,
    CreatePost,
    GetPost,
    GetUser,
    GetFeed,
    CreateComment,
    GetComments,
    CreateEdge,
    UpdateUser,
}

impl Endpoint {
    pub const ALL: &'static [Endpoint] = &[
        Endpoint::CreateAccount,
        Endpoint::SignIn,
        Endpoint::CreatePost,
        Endpoint::GetPost,
        Endpoint::GetUser,
        Endpoint::GetFeed,
        Endpoint::CreateComment,
        Endpoint::GetComments,
        Endpoint::CreateEdge,
        Endpoint::UpdateUser,
    ];

    /// Wire name, used as the route path segment under `/api/`.
    pub fn name(self) -> &'static str {
        match self {
            Endpoint::CreateAccount => "createAccount",
            Endpoint::SignIn => "signIn",
            Endpoint::CreatePost => "createPost",
            Endpoint::GetPost => "getPost",
            Endpoint::GetUser => "getUser",
            Endpoint::GetFeed => "getFeed",
            Endpoint::CreateComment => "createComment",
            Endpoint::GetComments => "getComments",
            Endpoint::CreateEdge => "createEdge",
            Endpoint::UpdateUser => "updateUser",
        }
    }
}

/// Field type and constraints for query validation.
#[derive(Debug)]
pub enum FieldType {
    /// A non-empty string of at most `max_len` characters.
    Str { max_len: usize },
    /// A signed integer.
    Int,
    /// An array of strings.
    StrList,
    /// A string drawn from a fixed set.
    OneOf(&'static [&'static str]),
}

#[derive(Debug)]
pub struct Field {
    pub name: &'static str,
    pub ty: FieldType,
    pub required: bool,
}

/// Query-side schema: required fields, types, and constraints.
#[derive(Debug)]
pub struct Schema {
    pub fields: &'static [Field],
}

impl Schema {
    /// Validate a request body, returning every violated field.
    ///
    /// Unknown fields are allowed; the token field in particular rides along
    /// in the same body.
    pub fn validate(&self, body: &Value) -> Result<(), Vec<String>> {
        let Some(object) = body.as_object() else {
            return Err(vec!["body: expected a JSON object".to_string()]);
        };

        let mut violations = Vec::new();

        for field in self.fields {
            let value = match object.get(field.name) {
                Some(Value::Null) | None => {
                    if field.required {
                        violations.push(format!("{}: required", field.name));
                    }
                    continue;
                }
                Some(value) => value,
            };

            match &field.ty {
                FieldType::Str { max_len } => match value.as_str() {
                    Some(s) if s.is_empty() => {
                        violations.push(format!("{}: must not be empty", field.name));
                    }
                    Some(s) if s.chars().count() > *max_len => {
                        violations.push(format!("{}: longer than {} characters", field.name, max_len));
                    }
                    Some(_) => {}
                    None => violations.push(format!("{}: expected a string", field.name)),
                },
                FieldType::Int => {
                    if value.as_i64().is_none() {
                        violations.push(format!("{}: expected an integer", field.name));
                    }
                }
                FieldType::StrList => match value.as_array() {
                    Some(items) if items.iter().all(Value::is_string) => {}
                    _ => violations.push(format!("{}: expected an array of strings", field.name)),
                },
                FieldType::OneOf(allowed) => match value.as_str() {
                    Some(s) if allowed.contains(&s) => {}
                    _ => violations.push(format!(
                        "{}: expected one of [{}]",
                        field.name,
                        allowed.join(", ")
                    )),
                },
            }
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }
}

/// One registry entry.
#[derive(Debug)]
pub struct EndpointSpec {
    pub endpoint: Endpoint,
    pub query: Schema,
    /// Top-level keys of a successful response. Not enforced at runtime;
    /// tests assert handlers stay in shape.
    pub response: &'static [&'static str],
    pub requires_auth: bool,
}

const USER_RESPONSE: &[&str] = &[
    "id",
    "username",
    "displayName",
    "email",
    "profileBackground",
    "profilePicture",
    "lastTokenReset",
];

const POST_RESPONSE: &[&str] = &["id", "author", "media", "created", "expires", "description"];

pub static REGISTRY: &[EndpointSpec] = &[
    EndpointSpec {
        endpoint: Endpoint::CreateAccount,
        query: Schema {
            fields: &[
                Field {
                    name: "username",
                    ty: FieldType::Str { max_len: 32 },
                    required: true,
                },
                Field {
                    name: "password",
                    ty: FieldType::Str { max_len: 128 },
                    required: true,
                },
                Field {
                    name: "displayName",
                    ty: FieldType::Str { max_len: 64 },
                    required: true,
                },
                Field {
                    name: "email",
                    ty: FieldType::Str { max_len: 128 },
                    required: true,
                },
            ],
        },
        response: &["id"],
        requires_auth: false,
    },
    EndpointSpec {
        endpoint: Endpoint::SignIn,
        query: Schema {
            fields: &[
                Field {
                    name: "username",
                    ty: FieldType::Str { max_len: 32 },
                    required: true,
                },
                Field {
                    name: "password",
                    ty: FieldType::Str { max_len: 128 },
                    required: true,
                },
            ],
        },
        response: &["id", "token"],
        requires_auth: false,
    },
    EndpointSpec {
        endpoint: Endpoint::CreatePost,
        query: Schema {
            fields: &[
                Field {
                    name: "description",
                    ty: FieldType::Str { max_len: 2000 },
                    required: true,
                },
                Field {
                    name: "media",
                    ty: FieldType::Str { max_len: 64 },
                    required: true,
                },
                Field {
                    name: "expires",
                    ty: FieldType::Int,
                    required: false,
                },
            ],
        },
        response: &["id"],
        requires_auth: true,
    },
    EndpointSpec {
        endpoint: Endpoint::GetPost,
        query: Schema {
            fields: &[Field {
                name: "id",
                ty: FieldType::Str { max_len: 64 },
                required: true,
            }],
        },
        response: POST_RESPONSE,
        requires_auth: false,
    },
    EndpointSpec {
        endpoint: Endpoint::GetUser,
        query: Schema {
            fields: &[Field {
                name: "id",
                ty: FieldType::Str { max_len: 64 },
                required: true,
            }],
        },
        response: USER_RESPONSE,
        requires_auth: false,
    },
    EndpointSpec {
        endpoint: Endpoint::GetFeed,
        query: Schema {
            fields: &[Field {
                name: "author",
                ty: FieldType::StrList,
                required: false,
            }],
        },
        response: &["posts"],
        requires_auth: false,
    },
    EndpointSpec {
        endpoint: Endpoint::CreateComment,
        query: Schema {
            fields: &[
                Field {
                    name: "text",
                    ty: FieldType::Str { max_len: 1000 },
                    required: true,
                },
                Field {
                    name: "parent",
                    ty: FieldType::Str { max_len: 64 },
                    required: true,
                },
            ],
        },
        response: &["id"],
        requires_auth: true,
    },
    EndpointSpec {
        endpoint: Endpoint::GetComments,
        query: Schema {
            fields: &[Field {
                name: "parent",
                ty: FieldType::Str { max_len: 64 },
                required: true,
            }],
        },
        response: &["comments"],
        requires_auth: false,
    },
    EndpointSpec {
        endpoint: Endpoint::CreateEdge,
        query: Schema {
            fields: &[
                Field {
                    name: "target",
                    ty: FieldType::Str { max_len: 64 },
                    required: true,
                },
                Field {
                    name: "kind",
                    ty: FieldType::OneOf(&["follow", "like"]),
                    required: true,
                },
            ],
        },
        response: &["id"],
        requires_auth: true,
    },
    EndpointSpec {
        endpoint: Endpoint::UpdateUser,
        query: Schema {
            fields: &[
                Field {
                    name: "displayName",
                    ty: FieldType::Str { max_len: 64 },
                    required: false,
                },
                Field {
                    name: "email",
                    ty: FieldType::Str { max_len: 128 },
                    required: false,
                },
                Field {
                    name: "profileBackground",
                    ty: FieldType::Str { max_len: 64 },
                    required: false,
                },
                Field {
                    name: "profilePicture",
                    ty: FieldType::Str { max_len: 64 },
                    required: false,
                },
            ],
        },
        response: USER_RESPONSE,
        requires_auth: true,
    },
];

/// Find the registry entry for an endpoint name.
pub fn lookup(name: &str) -> Option<&'static EndpointSpec> {
    REGISTRY.iter().find(|spec| spec.endpoint.name() == name)
}

/// Startup invariant: the registry covers every endpoint exactly once.
///
/// A mismatch between the table and the handler set is a programming error;
/// callers should abort rather than serve a partial API.
pub fn verify() -> Result<(), String> {
    for endpoint in Endpoint::ALL {
        let count = REGISTRY
            .iter()
            .filter(|spec| spec.endpoint == *endpoint)
            .count();
        if count != 1 {
            return Err(format!(
                "endpoint {} registered {} times",
                endpoint.name(),
                count
            ));
        }
    }

    if REGISTRY.len() != Endpoint::ALL.len() {
        return Err(format!(
            "registry has {} entries for {} endpoints",
            REGISTRY.len(),
            Endpoint::ALL.len()
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_registry_is_complete() {
        verify().expect("registry must cover every endpoint exactly once");
    }

    #[test]
    fn test_lookup_by_wire_name() {
        let spec = lookup("createPost").expect("createPost is registered");
        assert_eq!(spec.endpoint, Endpoint::CreatePost);
        assert!(spec.requires_auth);

        assert!(lookup("noSuchEndpoint").is_none());
    }

    #[test]
    fn test_mutations_require_auth() {
        for name in ["createPost", "createComment", "createEdge", "updateUser"] {
            assert!(lookup(name).unwrap().requires_auth, "{} must be authed", name);
        }
        for name in ["createAccount", "signIn", "getPost", "getUser", "getFeed"] {
            assert!(!lookup(name).unwrap().requires_auth, "{} is public", name);
        }
    }

    #[test]
    fn test_schema_reports_all_violations() {
        let spec = lookup("createAccount").unwrap();
        let err = spec
            .query
            .validate(&json!({ "username": "bob" }))
            .unwrap_err();

        assert_eq!(err.len(), 3);
        assert!(err.iter().any(|v| v.starts_with("password:")));
        assert!(err.iter().any(|v| v.starts_with("displayName:")));
        assert!(err.iter().any(|v| v.starts_with("email:")));
    }

    #[test]
    fn test_schema_checks_types_and_lengths() {
        let spec = lookup("createAccount").unwrap();

        let err = spec
            .query
            .validate(&json!({
                "username": "a".repeat(33),
                "password": 42,
                "displayName": "",
                "email": "bob@example.com"
            }))
            .unwrap_err();

        assert!(err.iter().any(|v| v.contains("longer than 32")));
        assert!(err.iter().any(|v| v.contains("expected a string")));
        assert!(err.iter().any(|v| v.contains("must not be empty")));
    }

    #[test]
    fn test_schema_enforces_enum_membership() {
        let spec = lookup("createEdge").unwrap();

        let err = spec
            .query
            .validate(&json!({ "target": "user-2", "kind": "block" }))
            .unwrap_err();
        assert!(err.iter().any(|v| v.starts_with("kind:")));

        spec.query
            .validate(&json!({ "target": "user-2", "kind": "follow" }))
            .expect("follow is a valid kind");
    }

    #[test]
    fn test_schema_allows_unknown_fields() {
        let spec = lookup("signIn").unwrap();
        spec.query
            .validate(&json!({
                "username": "bob",
                "password": "pw",
                "token": "rides-along"
            }))
            .expect("unknown fields are not violations");
    }

    #[test]
    fn test_schema_rejects_non_object_body() {
        let spec = lookup("signIn").unwrap();
        assert!(spec.query.validate(&json!([1, 2, 3])).is_err());
    }
}
