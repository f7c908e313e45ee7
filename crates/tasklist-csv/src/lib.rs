// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod codec;
pub mod file;

pub use codec::{DecodeError, HeaderPolicy, TASK_HEADER, decode, encode};
pub use file::{
    APP_NAME, CsvStorage, DEFAULT_CSV_FILE, default_csv_path, init_file, load_file,
    validate_csv_path, write_atomic,
};
