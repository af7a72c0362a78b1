// This is free and unencumbered software released into the public domain.

mod binder;
pub use binder::*;

mod config;
pub use config::*;

mod device;
pub use device::*;

mod driver;
pub use driver::*;

pub mod drivers {
    #[cfg(feature = "ffmpeg")]
    pub mod ffmpeg;
}

mod error;
pub use error::*;

mod open;
pub use open::*;

mod surface;
pub use surface::*;

#[cfg(test)]
pub(crate) mod testing;
