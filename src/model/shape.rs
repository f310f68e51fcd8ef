use indexmap::IndexMap;
use serde::Deserialize;

/// Scalar and container categories the coercer and serializers distinguish.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    String,
    /// `integer` and `long`
    Integer,
    /// `float` and `double`
    Float,
    Boolean,
    List,
    Structure,
    Map,
    Timestamp,
    Blob,
    /// Anything newer; values pass through untouched.
    Other,
}

/// Where a member is placed on the wire by the rest protocols.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Location {
    Uri,
    Querystring,
    Header,
    Headers,
    #[serde(rename = "statusCode")]
    StatusCode,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct XmlNamespace {
    pub uri: Option<String>,
    pub prefix: Option<String>,
}

/// A reference from a structure member, list element or map key/value to a
/// named shape, plus the serialization hints attached to that reference.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberRef {
    pub shape: String,
    pub location: Option<Location>,
    pub location_name: Option<String>,
    pub query_name: Option<String>,
    #[serde(default)]
    pub flattened: bool,
    pub xml_namespace: Option<XmlNamespace>,
    #[serde(default)]
    pub xml_attribute: bool,
    /// Element wrapping an operation's output in the query protocols.
    pub result_wrapper: Option<String>,
}

impl MemberRef {
    /// True for members that travel in the request body.
    pub fn in_body(&self) -> bool {
        matches!(self.location, None | Some(Location::Unknown))
    }
}

/// Schema node for one API parameter type.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParamShape {
    /// Filled in from the key of the `shapes` table when the model is loaded.
    #[serde(skip)]
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub members: IndexMap<String, MemberRef>,
    pub member: Option<MemberRef>,
    pub key: Option<MemberRef>,
    pub value: Option<MemberRef>,
    #[serde(default)]
    pub flattened: bool,
    pub location_name: Option<String>,
    pub payload: Option<String>,
    #[serde(default)]
    pub required: Vec<String>,
}

impl ParamShape {
    pub fn kind(&self) -> ShapeKind {
        match self.type_name.as_str() {
            "string" => ShapeKind::String,
            "integer" | "long" => ShapeKind::Integer,
            "float" | "double" => ShapeKind::Float,
            "boolean" => ShapeKind::Boolean,
            "list" => ShapeKind::List,
            "structure" => ShapeKind::Structure,
            "map" => ShapeKind::Map,
            "timestamp" => ShapeKind::Timestamp,
            "blob" => ShapeKind::Blob,
            _ => ShapeKind::Other,
        }
    }

    /// Finds a structure member by its canonical name or its alternate
    /// serialization name, ignoring ASCII case. Canonical names win.
    pub fn find_member(&self, key: &str) -> Option<(&str, &MemberRef)> {
        self.members
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(key))
            .or_else(|| {
                self.members.iter().find(|(_, member)| {
                    member
                        .location_name
                        .as_deref()
                        .is_some_and(|alt| alt.eq_ignore_ascii_case(key))
                })
            })
            .map(|(name, member)| (name.as_str(), member))
    }
}

/// Looks shapes up by name. Shapes may refer to themselves, so children are
/// always resolved through this trait instead of being owned by the parent.
pub trait ShapeResolver {
    fn resolve(&self, name: &str) -> Option<&ParamShape>;
}
