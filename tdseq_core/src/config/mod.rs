pub mod seq_config;
