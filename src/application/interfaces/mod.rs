mod generative_client;

pub use generative_client::*;
