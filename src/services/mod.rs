pub mod lexicon;
pub mod mapper;
pub mod orchestrator;
pub mod resolver;
pub mod storage;
pub mod transcriber;
