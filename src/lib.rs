// themegen: discover latent themes in short survey responses
//
// This is the library root. Each module corresponds to one stage of the
// pipeline: corpus → text → vectorize → topics → output.

pub mod config;
pub mod corpus;
pub mod output;
pub mod text;
pub mod topics;
pub mod vectorize;
