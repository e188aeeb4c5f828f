pub mod airr;
pub mod io;
pub mod network;
