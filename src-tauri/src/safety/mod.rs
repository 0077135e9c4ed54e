//! Safety layer: keeps the API key out of logs and error dialogs.
//!
//! Every diagnostic built from a transport or API failure passes through
//! redaction before it is logged or handed to the interactive surface.

pub mod redact;
