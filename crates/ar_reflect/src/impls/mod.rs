//! [`Typed`](crate::Typed) implementations for std and third-party types.
//!
//! | Types | Kind |
//! |-------|------|
//! | integers, floats, `bool`, `char`, `String` | Scalar |
//! | `DateTime<Utc>`, `NaiveDate`, `NaiveDateTime` (feature `chrono`) | Scalar |
//! | `Uuid` (feature `uuid`) | Scalar |
//! | `Vec<T>`, `VecDeque<T>` | Enumerable |
//! | `[T; N]` | Array |
//! | `HashMap<K, V, S>`, `BTreeMap<K, V>` | Dictionary |
//! | `Option<T>`, `OnceLock<T>`, `Arc<T>`, `Box<dyn Reflect>` | as the wrapped type |

mod collections;
mod primitives;
mod wrappers;

#[cfg(feature = "chrono")]
mod chrono;

#[cfg(feature = "uuid")]
mod uuid;
