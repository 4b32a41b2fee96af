//! The bean registry: beans indexed by name, declared type and interface.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use crate::model::{erase_generics, BeanDefinition};

/// Beans discovered in a workspace.
///
/// Bean names are unique; re-adding a name replaces the earlier definition
/// and drops its stale type and interface entries.
#[derive(Debug, Default, Clone)]
pub struct BeanRegistry {
    /// Bean name -> definition
    by_name: BTreeMap<String, BeanDefinition>,

    /// Normalized declared type -> bean names, in insertion order
    by_type: HashMap<String, Vec<String>>,

    /// Interface name (generics erased) -> bean names, in insertion order
    by_interface: HashMap<String, Vec<String>>,
}

/// Type text without whitespace, so `Map<String, Foo>` and `Map<String,Foo>` agree.
pub(crate) fn type_key(ty: &str) -> String {
    ty.chars().filter(|c| !c.is_whitespace()).collect()
}

/// `com.example.Foo<Bar>` -> `Foo<Bar>`; `None` when already simple.
fn simple_type_key(key: &str) -> Option<String> {
    let base = erase_generics(key);
    let (_, simple) = base.rsplit_once('.')?;
    Some(format!("{}{}", simple, &key[base.len()..]))
}

fn push_unique(bucket: &mut Vec<String>, name: &str) {
    if !bucket.iter().any(|n| n == name) {
        bucket.push(name.to_string());
    }
}

fn remove_from(map: &mut HashMap<String, Vec<String>>, key: &str, name: &str) {
    if let Some(bucket) = map.get_mut(key) {
        bucket.retain(|n| n != name);
        if bucket.is_empty() {
            map.remove(key);
        }
    }
}

impl BeanRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a bean by name.
    pub fn add(&mut self, bean: BeanDefinition) {
        let name = bean.name.clone();
        if let Some(previous) = self.by_name.remove(&name) {
            self.unindex(&previous);
        }

        push_unique(
            self.by_type.entry(type_key(&bean.bean_type)).or_default(),
            &name,
        );
        for interface in &bean.interfaces {
            push_unique(
                self.by_interface
                    .entry(type_key(erase_generics(interface)))
                    .or_default(),
                &name,
            );
        }
        self.by_name.insert(name, bean);
    }

    fn unindex(&mut self, bean: &BeanDefinition) {
        remove_from(&mut self.by_type, &type_key(&bean.bean_type), &bean.name);
        for interface in &bean.interfaces {
            remove_from(
                &mut self.by_interface,
                &type_key(erase_generics(interface)),
                &bean.name,
            );
        }
    }

    pub fn find_by_name(&self, name: &str) -> Option<&BeanDefinition> {
        self.by_name.get(name)
    }

    /// Beans whose declared type is `target_type` or that implement it,
    /// de-duplicated by name, direct type matches first.
    pub fn find_by_type(&self, target_type: &str) -> Vec<&BeanDefinition> {
        let key = type_key(target_type);
        if key.is_empty() {
            return Vec::new();
        }
        let found = self.lookup(&key);
        if !found.is_empty() {
            return found;
        }
        match simple_type_key(&key) {
            Some(simple) => self.lookup(&simple),
            None => found,
        }
    }

    fn lookup(&self, key: &str) -> Vec<&BeanDefinition> {
        let direct = self.by_type.get(key).into_iter().flatten();
        let via_interface = self
            .by_interface
            .get(erase_generics(key))
            .into_iter()
            .flatten();

        let mut seen: Vec<&str> = Vec::new();
        let mut beans = Vec::new();
        for name in direct.chain(via_interface) {
            if seen.contains(&name.as_str()) {
                continue;
            }
            seen.push(name);
            if let Some(bean) = self.by_name.get(name) {
                beans.push(bean);
            }
        }
        beans
    }

    /// Remove every bean defined in `file`.
    pub fn remove_file(&mut self, file: &Path) {
        let stale: Vec<BeanDefinition> = self
            .by_name
            .values()
            .filter(|b| b.file_ref == file)
            .cloned()
            .collect();
        for bean in &stale {
            self.by_name.remove(&bean.name);
            self.unindex(bean);
        }
    }

    pub fn clear(&mut self) {
        self.by_name.clear();
        self.by_type.clear();
        self.by_interface.clear();
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    /// All beans, ordered by name.
    pub fn iter(&self) -> impl Iterator<Item = &BeanDefinition> {
        self.by_name.values()
    }

    /// Files that define at least one bean.
    pub fn files(&self) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = self.by_name.values().map(|b| b.file_ref.clone()).collect();
        files.sort();
        files.dedup();
        files
    }
}

impl Extend<BeanDefinition> for BeanRegistry {
    fn extend<T: IntoIterator<Item = BeanDefinition>>(&mut self, iter: T) {
        for bean in iter {
            self.add(bean);
        }
    }
}
