pub mod commands;
pub mod config;
pub mod dedup;
pub mod dictionary;
pub mod error;
pub mod extractor;
pub mod fs;
pub mod http;
pub mod logging;
pub mod object_literal;
pub mod replacer;
pub mod report;
pub mod resolver;
pub mod translator;
pub mod uploader;
pub mod walker;
