pub mod error;
pub mod gateway;
pub mod lead;
pub mod message;
pub mod phone;
pub mod template;
pub mod transport;

pub use error::RelayError;
pub use gateway::{CloudApiClient, CloudApiConfig};
pub use lead::{build_lead_request, send_lead_message, LeadContact, Substitutions};
pub use message::{MessagePayload, SendReceipt};
pub use transport::{DirectTransport, RestTransport, SendRequest, Transport, TransportSelector};
