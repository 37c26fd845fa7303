//! Unit tests for resume-sender

mod export_files;
