pub mod silence;
pub mod speech;
pub mod storage;
pub mod wav;
