//! The upstream operations the relay forwards.

use std::fmt;

use reqwest::Method;

/// One upstream endpoint, identified by method and path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    ListAgents,
    CreateAgent,
    ListKnowledgeBases,
    CreateKnowledgeBase,
}

impl Operation {
    pub const ALL: [Self; 4] = [
        Self::ListAgents,
        Self::CreateAgent,
        Self::ListKnowledgeBases,
        Self::CreateKnowledgeBase,
    ];

    pub fn method(self) -> Method {
        match self {
            Self::ListAgents | Self::ListKnowledgeBases => Method::GET,
            Self::CreateAgent | Self::CreateKnowledgeBase => Method::POST,
        }
    }

    /// Resource path, identical on the relay and on the upstream.
    pub const fn path(self) -> &'static str {
        match self {
            Self::ListAgents | Self::CreateAgent => "/agents",
            Self::ListKnowledgeBases | Self::CreateKnowledgeBase => "/knowledge-bases",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ListAgents => write!(f, "list_agents"),
            Self::CreateAgent => write!(f, "create_agent"),
            Self::ListKnowledgeBases => write!(f, "list_knowledge_bases"),
            Self::CreateKnowledgeBase => write!(f, "create_knowledge_base"),
        }
    }
}
