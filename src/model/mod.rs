pub mod channels;
pub mod state;
pub mod topology;
