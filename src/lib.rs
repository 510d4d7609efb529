#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub use ar_formats as formats;
pub use ar_map as map;
pub use ar_node as node;
pub use ar_reflect as reflect;
pub use ar_utils as utils;
