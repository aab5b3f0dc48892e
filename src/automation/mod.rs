//! Automation module
//!
//! Capability traits consumed by the image engine and the agent-browser
//! implementation of them.

mod agent_browser;
mod traits;

pub use agent_browser::{AgentBrowser, AgentBrowserPage};
pub use traits::{AutomationBrowser, AutomationContext, AutomationPage};
