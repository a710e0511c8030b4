mod binder;
mod dom;
mod events;
mod image;
mod popup;
mod proportion;
mod scheduler;
mod store;
mod video;
mod window;

pub use crate::binder::*;
pub use crate::dom::*;
pub use crate::events::*;
pub use crate::image::*;
pub use crate::popup::*;
pub use crate::proportion::*;
pub use crate::scheduler::*;
pub use crate::store::*;
pub use crate::video::*;
pub use crate::window::*;
