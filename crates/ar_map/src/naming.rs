use core::fmt;

use ar_reflect::{CachedMember, Case, MemberCategory};
use convert_case::Casing;

type ConvertFn = dyn Fn(&str) -> String + Send + Sync;
type MemberPredicate = dyn Fn(&CachedMember) -> bool + Send + Sync;

// -----------------------------------------------------------------------------
// NamingRule

/// One naming convention: a conversion, optionally limited to a member
/// category and gated by a predicate.
pub struct NamingRule {
    category: Option<MemberCategory>,
    when: Option<Box<MemberPredicate>>,
    convert: Box<ConvertFn>,
}

impl NamingRule {
    /// Only apply the rule to members accepted by `predicate`.
    pub fn when<P>(&mut self, predicate: P) -> &mut Self
    where
        P: Fn(&CachedMember) -> bool + Send + Sync + 'static,
    {
        self.when = Some(Box::new(predicate));
        self
    }

    fn applies(&self, member: &CachedMember) -> bool {
        self.category.is_none_or(|category| category == member.category())
            && self.when.as_ref().is_none_or(|when| when(member))
    }
}

impl fmt::Debug for NamingRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NamingRule")
            .field("category", &self.category)
            .field("gated", &self.when.is_some())
            .finish_non_exhaustive()
    }
}

// -----------------------------------------------------------------------------
// NamingConventions

/// Ordered rules turning member names into node names.
///
/// Rules only apply to members without a declared name (`rename` or
/// `rename_all`). Every applicable rule runs in registration order, each on
/// the output of the previous one.
///
/// # Example
///
/// ```
/// use ar_map::NamingConventions;
/// use ar_reflect::{Case, MemberCategory, derive::Reflect};
///
/// #[derive(Reflect)]
/// struct Row {
///     row_id: u32,
///     #[reflect(property)]
///     display_name: String,
///     #[reflect(rename = "KEEP_ME")]
///     kept: bool,
/// }
///
/// let mut naming = NamingConventions::default();
/// naming.use_case(Case::Pascal);
/// naming.add_for(MemberCategory::Property, |name| format!("{name}Prop"));
///
/// let ty = ar_reflect::resolve::<Row>();
/// let names: Vec<_> = ty.members().iter().map(|m| naming.apply(m)).collect();
/// assert_eq!(names, ["RowId", "DisplayNameProp", "KEEP_ME"]);
/// ```
#[derive(Debug, Default)]
pub struct NamingConventions {
    rules: Vec<NamingRule>,
}

impl NamingConventions {
    /// Adds a rule for every member.
    pub fn add<F>(&mut self, convert: F) -> &mut NamingRule
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.push(None, Box::new(convert))
    }

    /// Adds a rule for members of one category.
    pub fn add_for<F>(&mut self, category: MemberCategory, convert: F) -> &mut NamingRule
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.push(Some(category), Box::new(convert))
    }

    /// Adds a rule converting every member name to `case`.
    pub fn use_case(&mut self, case: Case) -> &mut NamingRule {
        self.add(move |name| name.to_case(case))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// The node name of `member`.
    pub fn apply(&self, member: &CachedMember) -> String {
        if member.has_declared_name() {
            return member.node_name().to_owned();
        }
        self.rules
            .iter()
            .filter(|rule| rule.applies(member))
            .fold(member.name().to_owned(), |name, rule| (rule.convert)(&name))
    }

    fn push(&mut self, category: Option<MemberCategory>, convert: Box<ConvertFn>) -> &mut NamingRule {
        let index = self.rules.len();
        self.rules.push(NamingRule {
            category,
            when: None,
            convert,
        });
        &mut self.rules[index]
    }
}

// -----------------------------------------------------------------------------
// Tests
