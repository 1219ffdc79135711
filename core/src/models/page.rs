use serde::{Deserialize, Serialize};

/// Pagination metadata of a list response
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PageInfo {
    pub count: u32,
    pub pages: u32,
    pub next: Option<String>,
    pub prev: Option<String>,
}

/// One page of a filtered listing
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Page<T> {
    pub info: PageInfo,
    pub results: Vec<T>,
}
