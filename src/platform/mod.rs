pub mod mount;
pub mod storage;
pub mod title;

pub use mount::{HostMounter, MountHandle, Mounter};
pub use storage::{ByteReader, ByteWriter, HostStorage, Storage};
pub use title::{ConfiguredTitle, TitleIdentity};
