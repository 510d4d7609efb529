use ::uuid::Uuid;

use crate::{ScalarFamily, impl_text_scalar};

// Accepts hyphenated, simple, braced and urn forms; writes hyphenated.
impl_text_scalar!(Uuid, ScalarFamily::Uuid, default);

#[cfg(test)]
mod tests {
    use ::uuid::Uuid;
    use ar_node::Value;

    use crate::Scalar;

    #[test]
    fn uuids_are_text() {
        let id = Uuid::from_value(Value::from("67e55044-10b1-426f-9247-bb680e5fe0c8")).unwrap();
        assert_eq!(Uuid::from_value(Value::from("67e5504410b1426f9247bb680e5fe0c8")).unwrap(), id);
        assert_eq!(id.to_value(), Value::from("67e55044-10b1-426f-9247-bb680e5fe0c8"));
        assert!(Uuid::from_value(Value::from("not-a-uuid")).is_err());
    }

    #[test]
    fn default_is_nil() {
        let nil = crate::resolve::<Uuid>().construct_default().unwrap().unwrap();
        assert_eq!(nil.downcast_ref::<Uuid>(), Some(&Uuid::nil()));
    }
}
