//! The protocol core: sequence-space arithmetic, the wire frame codec,
//! sender/receiver window state machines, the variant policy objects, and
//! the event-loop skeleton that ties them together. Everything outside
//! this module (the physical/network/timer layers and the simulation
//! driver) is an external collaborator the core only talks to through
//! [`traits`].

pub mod endpoint;
pub mod event;
pub mod frame;
pub mod policy;
pub mod receiver;
pub mod sender;
pub mod seq;
pub mod traits;

pub use endpoint::Endpoint;
pub use event::Event;
pub use frame::{Frame, FrameError};
pub use policy::{DataTimeoutAction, GbnAck, GbnNak, GbnNoAck, NakAction, SelectiveRepeat, SrRetransmitStrategy, VariantPolicy};
pub use traits::{NetworkLayer, PhysicalLayer, TimerService};
