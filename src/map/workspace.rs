#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ElementKind {
    Role,
    Participant,
    Action,
    Discussion,
    Document,
    MessageRule,
    MessageType,
}

impl ElementKind {
    pub const ALL: [ElementKind; 7] = [
        Self::Role,
        Self::Participant,
        Self::Action,
        Self::Discussion,
        Self::Document,
        Self::MessageRule,
        Self::MessageType,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Role => "Roles",
            Self::Participant => "Participants",
            Self::Action => "Actions",
            Self::Discussion => "Discussions",
            Self::Document => "Documents",
            Self::MessageRule => "Message rules",
            Self::MessageType => "Message types",
        }
    }
}

/// A dated workspace element (participant, object, message type).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ElementRecord {
    pub name: String,
    /// Identity used when matching the same element across workspaces.
    pub url: Option<String>,
    pub created: Option<u64>,
}

impl ElementRecord {
    pub fn sharing_key(&self) -> &str {
        self.url.as_deref().unwrap_or(&self.name)
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct RoleRecord {
    pub name: String,
    pub created: Option<u64>,
    pub participants: Vec<String>,
    pub assigned_objects: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct MessageRuleRecord {
    pub source_type: String,
    pub target_type: String,
    pub target_role: Option<String>,
    pub target_workspace: String,
    pub target_owner: String,
}

impl MessageRuleRecord {
    pub fn describe(&self) -> String {
        format!("{} -> {}", self.source_type, self.target_type)
    }
}

/// Everything the statistics layer and the link builder need to know about
/// one workspace.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WorkspaceInfo {
    pub name: String,
    pub owner: String,
    pub goal: Option<String>,
    pub workgroup: Option<String>,
    pub created: Option<u64>,
    pub roles: Vec<RoleRecord>,
    pub participants: Vec<ElementRecord>,
    pub documents: Vec<ElementRecord>,
    pub discussions: Vec<ElementRecord>,
    pub actions: Vec<ElementRecord>,
    pub message_types: Vec<ElementRecord>,
    pub message_rules: Vec<MessageRuleRecord>,
    pub messages_sent: Vec<u64>,
    pub messages_received: Vec<u64>,
}

impl WorkspaceInfo {
    pub fn new(name: impl Into<String>, owner: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            owner: owner.into(),
            ..Self::default()
        }
    }

    pub fn has_object(&self, name: &str) -> bool {
        self.documents
            .iter()
            .chain(&self.discussions)
            .chain(&self.actions)
            .any(|object| object.name == name)
    }

    pub fn object_kind(&self, name: &str) -> Option<ElementKind> {
        if self.documents.iter().any(|object| object.name == name) {
            Some(ElementKind::Document)
        } else if self.discussions.iter().any(|object| object.name == name) {
            Some(ElementKind::Discussion)
        } else if self.actions.iter().any(|object| object.name == name) {
            Some(ElementKind::Action)
        } else {
            None
        }
    }
}
