use core::hash::{BuildHasher, Hash};
use std::collections::{BTreeMap, HashMap, VecDeque};

use crate::__macro_exports::take;
use crate::{CachedType, DictionaryInfo, Reflect, ReflectError, SequenceInfo, TypeBuilder, Typed};

type Entries = Vec<(Box<dyn Reflect>, Box<dyn Reflect>)>;

fn take_items<T: Typed>(items: Vec<Box<dyn Reflect>>) -> Result<Vec<T>, ReflectError> {
    items.into_iter().map(take::<T>).collect()
}

fn take_entries<K: Typed, V: Typed>(entries: Entries) -> impl Iterator<Item = Result<(K, V), ReflectError>> {
    entries
        .into_iter()
        .map(|(key, value)| -> Result<(K, V), ReflectError> {
            Ok((take::<K>(key)?, take::<V>(value)?))
        })
}

// -----------------------------------------------------------------------------
// Sequences

macro_rules! impl_list {
    ($ty:ident) => {
        impl<T: Typed> Typed for $ty<T> {
            fn build_type() -> CachedType {
                TypeBuilder::<Self>::new()
                    .sequence(SequenceInfo::new::<T>(
                        |any| match any.downcast_ref::<$ty<T>>() {
                            Some(list) => list.iter().map(|item| item as &dyn Reflect).collect(),
                            None => Vec::new(),
                        },
                        |items| {
                            let list: $ty<T> = take_items::<T>(items)?.into_iter().collect();
                            Ok(Box::new(list) as Box<dyn Reflect>)
                        },
                    ))
                    .default_constructor()
                    .build()
            }
        }
    };
}

impl_list!(Vec);
impl_list!(VecDeque);

impl<T: Typed, const N: usize> Typed for [T; N] {
    fn build_type() -> CachedType {
        TypeBuilder::<Self>::new()
            .sequence(
                SequenceInfo::new::<T>(
                    |any| match any.downcast_ref::<[T; N]>() {
                        Some(array) => array.iter().map(|item| item as &dyn Reflect).collect(),
                        None => Vec::new(),
                    },
                    |items| {
                        let found = items.len();
                        let array: [T; N] = take_items::<T>(items)?.try_into().map_err(|_| {
                            ReflectError::Length {
                                type_name: crate::short_type_name(core::any::type_name::<[T; N]>()),
                                expected: N,
                                found,
                            }
                        })?;
                        Ok(Box::new(array) as Box<dyn Reflect>)
                    },
                )
                .fixed(N),
            )
            .build()
    }
}

// -----------------------------------------------------------------------------
// Dictionaries

impl<K, V, S> Typed for HashMap<K, V, S>
where
    K: Typed + Eq + Hash,
    V: Typed,
    S: BuildHasher + Default + Send + Sync + 'static,
{
    fn build_type() -> CachedType {
        TypeBuilder::<Self>::new()
            .dictionary(DictionaryInfo::new::<K, V>(
                |any| match any.downcast_ref::<HashMap<K, V, S>>() {
                    Some(map) => map
                        .iter()
                        .map(|(k, v)| (k as &dyn Reflect, v as &dyn Reflect))
                        .collect(),
                    None => Vec::new(),
                },
                |entries| {
                    let map = take_entries::<K, V>(entries).collect::<Result<HashMap<K, V, S>, _>>()?;
                    Ok(Box::new(map) as Box<dyn Reflect>)
                },
            ))
            .default_constructor()
            .build()
    }
}

impl<K, V> Typed for BTreeMap<K, V>
where
    K: Typed + Ord,
    V: Typed,
{
    fn build_type() -> CachedType {
        TypeBuilder::<Self>::new()
            .dictionary(DictionaryInfo::new::<K, V>(
                |any| match any.downcast_ref::<BTreeMap<K, V>>() {
                    Some(map) => map
                        .iter()
                        .map(|(k, v)| (k as &dyn Reflect, v as &dyn Reflect))
                        .collect(),
                    None => Vec::new(),
                },
                |entries| {
                    let map = take_entries::<K, V>(entries).collect::<Result<BTreeMap<K, V>, _>>()?;
                    Ok(Box::new(map) as Box<dyn Reflect>)
                },
            ))
            .default_constructor()
            .build()
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use std::collections::{BTreeMap, HashMap};

    use crate::{Reflect, ReflectError, TypeKind};

    #[test]
    fn vec_round_trips_through_items() {
        let ty = crate::resolve::<Vec<u32>>();
        let sequence = ty.sequence().unwrap();
        assert!(sequence.element().is::<u32>());
        assert_eq!(sequence.fixed_len(), None);

        let list = vec![1_u32, 2, 3];
        let items: Vec<Box<dyn Reflect>> = sequence
            .items(&list)
            .into_iter()
            .map(|item| Box::new(*item.downcast_ref::<u32>().unwrap()) as Box<dyn Reflect>)
            .collect();
        let rebuilt = sequence.build(items).unwrap();
        assert_eq!(rebuilt.downcast_ref::<Vec<u32>>(), Some(&list));
    }

    #[test]
    fn arrays_check_their_length() {
        let ty = crate::resolve::<[u8; 2]>();
        assert_eq!(ty.kind(), TypeKind::Array);
        assert!(ty.default_constructor().is_none());

        let sequence = ty.sequence().unwrap();
        let err = sequence.build(vec![Box::new(1_u8) as Box<dyn Reflect>]).unwrap_err();
        assert!(matches!(err, ReflectError::Length { expected: 2, found: 1, .. }));

        let ok = sequence.build(vec![Box::new(1_u8) as Box<dyn Reflect>, Box::new(2_u8)]).unwrap();
        assert_eq!(ok.downcast_ref::<[u8; 2]>(), Some(&[1, 2]));
    }

    #[test]
    fn items_of_the_wrong_type_are_rejected() {
        let sequence = crate::resolve::<Vec<u8>>().sequence().cloned().unwrap();
        let err = sequence.build(vec![Box::new(String::new()) as Box<dyn Reflect>]).unwrap_err();
        assert!(matches!(err, ReflectError::TypeMismatch { .. }));
    }

    #[test]
    fn dictionaries_expose_entries() {
        let ty = crate::resolve::<BTreeMap<String, i32>>();
        let dictionary = ty.dictionary().unwrap();
        assert!(dictionary.key().is::<String>());

        let map = BTreeMap::from([("a".to_owned(), 1), ("b".to_owned(), 2)]);
        let keys: Vec<_> = dictionary
            .entries(&map)
            .into_iter()
            .filter_map(|(k, _)| k.downcast_ref::<String>().cloned())
            .collect();
        assert_eq!(keys, ["a", "b"]);

        let built = crate::resolve::<HashMap<String, i32>>()
            .dictionary()
            .unwrap()
            .build(vec![(
                Box::new("k".to_owned()) as Box<dyn Reflect>,
                Box::new(9_i32) as Box<dyn Reflect>,
            )])
            .unwrap();
        assert_eq!(built.downcast_ref::<HashMap<String, i32>>().unwrap()["k"], 9);
    }
}
