//! The standard option plugin set.
//!
//! Each module implements one Telnet option (or a small family that
//! shares a plugin): its opening negotiation moves, subnegotiation
//! parsing and outbound subnegotiation emission. Configuration records
//! live next to their plugin and are reachable through
//! [`crate::Session::plugin_ref`] / [`crate::Session::plugin_mut`].

pub mod auth;
pub mod charset;
pub mod environ;
pub mod eor;
pub mod flow;
pub mod gmcp;
pub mod linemode;
pub mod mccp;
pub mod mssp;
pub mod naws;
pub mod sga;
pub mod tspeed;
pub mod ttype;
pub mod xdisploc;

pub use auth::{AuthConfig, AuthPlugin};
pub use charset::{CharsetConfig, CharsetPlugin};
pub use environ::{EnvironConfig, EnvironPlugin};
pub use eor::EorPlugin;
pub use flow::{FlowControlPlugin, FlowRestart};
pub use gmcp::GmcpPlugin;
pub use linemode::LinemodePlugin;
pub use mccp::MccpPlugin;
pub use mssp::{MsspConfig, MsspPlugin, MsspValue};
pub use naws::NawsPlugin;
pub use sga::SgaPlugin;
pub use tspeed::{TspeedConfig, TspeedPlugin};
pub use ttype::TtypePlugin;
pub use xdisploc::XdisplocPlugin;
