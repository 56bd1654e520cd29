pub mod wrapper;

pub use wrapper::UmdWrapper;
