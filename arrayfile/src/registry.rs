//! Name and extension lookup for arrayset codecs

use crate::codec::{normalize_extension, ArraysetCodec, ArraysetInfo, BinaryCodec, HierarchicalCodec};
use crate::{Arrayset, Error, IoConfig, Result};
use arrayfile_core::file_extension;
use hashbrown::HashMap;
use parking_lot::RwLock;
use std::path::Path;
use std::sync::{Arc, OnceLock};
use tracing::debug;

#[derive(Default)]
struct Tables {
    by_name: HashMap<String, Arc<dyn ArraysetCodec>>,
    by_extension: HashMap<String, Arc<dyn ArraysetCodec>>,
}

/// Thread-safe directory of codecs keyed by name and file extension
///
/// Lookups take a shared lock; registration and removal take an exclusive
/// one, so every change is seen all at once.
#[derive(Default)]
pub struct CodecRegistry {
    tables: RwLock<Tables>,
}

impl CodecRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the built-in binary and hierarchical codecs
    pub fn with_defaults(config: IoConfig) -> Self {
        let registry = Self::new();
        let defaults: [Arc<dyn ArraysetCodec>; 2] = [
            Arc::new(BinaryCodec::new(config)),
            Arc::new(HierarchicalCodec::new(config)),
        ];
        for codec in defaults {
            // Built-in names and extensions are distinct
            if let Err(e) = registry.add_codec(codec) {
                debug!(error = %e, "skipped built-in codec");
            }
        }
        registry
    }

    /// Process-wide registry, created with the built-in codecs on first use
    pub fn global() -> &'static CodecRegistry {
        static GLOBAL: OnceLock<CodecRegistry> = OnceLock::new();
        GLOBAL.get_or_init(|| CodecRegistry::with_defaults(IoConfig::default()))
    }

    /// Register a codec under its name and every extension it declares
    ///
    /// All keys are checked before anything is inserted; on any collision
    /// the registry is left unchanged.
    pub fn add_codec(&self, codec: Arc<dyn ArraysetCodec>) -> Result<()> {
        let name = codec.name().to_string();
        let extensions: Vec<String> = codec
            .extensions()
            .iter()
            .map(|e| normalize_extension(e))
            .collect();

        let mut tables = self.tables.write();
        if tables.by_name.contains_key(&name) {
            return Err(Error::NameAlreadyRegistered(name));
        }
        for (i, ext) in extensions.iter().enumerate() {
            if tables.by_extension.contains_key(ext) || extensions[..i].contains(ext) {
                return Err(Error::NameAlreadyRegistered(ext.clone()));
            }
        }

        for ext in &extensions {
            tables.by_extension.insert(ext.clone(), Arc::clone(&codec));
        }
        tables.by_name.insert(name.clone(), codec);
        debug!(codec = %name, ?extensions, "registered codec");
        Ok(())
    }

    /// Remove a codec and every extension pointing to it
    pub fn remove_codec_by_name(&self, name: &str) -> Result<Arc<dyn ArraysetCodec>> {
        let mut tables = self.tables.write();
        let codec = tables
            .by_name
            .remove(name)
            .ok_or_else(|| Error::CodecNotFound(name.to_string()))?;
        tables
            .by_extension
            .retain(|_, registered| !Arc::ptr_eq(registered, &codec));
        debug!(codec = name, "removed codec");
        Ok(codec)
    }

    /// Codec registered under `name`
    pub fn codec_by_name(&self, name: &str) -> Result<Arc<dyn ArraysetCodec>> {
        self.tables
            .read()
            .by_name
            .get(name)
            .cloned()
            .ok_or_else(|| Error::CodecNotFound(name.to_string()))
    }

    /// Codec claiming the final suffix of `filename`
    pub fn codec_by_extension(&self, filename: &str) -> Result<Arc<dyn ArraysetCodec>> {
        let ext = file_extension(filename);
        if ext.is_empty() {
            return Err(Error::ExtensionNotRegistered(filename.to_string()));
        }
        self.tables
            .read()
            .by_extension
            .get(ext)
            .cloned()
            .ok_or_else(|| Error::ExtensionNotRegistered(ext.to_string()))
    }

    /// Registered codec names, sorted
    pub fn codec_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tables.read().by_name.keys().cloned().collect();
        names.sort();
        names
    }

    /// Registered extensions with the codec name each maps to, sorted
    pub fn registered_extensions(&self) -> Vec<(String, String)> {
        let mut extensions: Vec<(String, String)> = self
            .tables
            .read()
            .by_extension
            .iter()
            .map(|(ext, codec)| (ext.clone(), codec.name().to_string()))
            .collect();
        extensions.sort();
        extensions
    }

    /// Decode the arrayset at `path` with the codec for its extension
    pub fn load<P: AsRef<Path>>(&self, path: P) -> Result<Arrayset> {
        let path = path.as_ref();
        self.codec_for_path(path)?.decode(path)
    }

    /// Encode `set` to `path` with the codec for its extension
    pub fn save<P: AsRef<Path>>(&self, path: P, set: &Arrayset) -> Result<()> {
        let path = path.as_ref();
        self.codec_for_path(path)?.encode(set, path)
    }

    /// Describe the arrayset at `path` with the codec for its extension
    pub fn peek<P: AsRef<Path>>(&self, path: P) -> Result<ArraysetInfo> {
        let path = path.as_ref();
        self.codec_for_path(path)?.peek(path)
    }

    fn codec_for_path(&self, path: &Path) -> Result<Arc<dyn ArraysetCodec>> {
        self.codec_by_extension(&path.to_string_lossy())
    }
}

impl std::fmt::Debug for CodecRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CodecRegistry")
            .field("codecs", &self.codec_names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Array;

    struct NamedCodec {
        name: &'static str,
        extensions: Vec<String>,
    }

    impl NamedCodec {
        fn new(name: &'static str, extensions: &[&str]) -> Arc<dyn ArraysetCodec> {
            Arc::new(Self {
                name,
                extensions: extensions.iter().map(|e| e.to_string()).collect(),
            })
        }
    }

    impl ArraysetCodec for NamedCodec {
        fn name(&self) -> &str {
            self.name
        }

        fn extensions(&self) -> &[String] {
            &self.extensions
        }

        fn encode(&self, _set: &Arrayset, _path: &Path) -> Result<()> {
            Ok(())
        }

        fn decode(&self, _path: &Path) -> Result<Arrayset> {
            Err(Error::External(format!("{} cannot decode", self.name)))
        }

        fn peek(&self, _path: &Path) -> Result<ArraysetInfo> {
            Err(Error::External(format!("{} cannot peek", self.name)))
        }
    }

    #[test]
    fn test_name_collision_keeps_first() {
        let registry = CodecRegistry::new();
        registry.add_codec(NamedCodec::new("a", &[".x", ".y"])).unwrap();
        let err = registry
            .add_codec(NamedCodec::new("a", &[".z"]))
            .unwrap_err();
        assert!(matches!(err, Error::NameAlreadyRegistered(ref key) if key == "a"));

        assert_eq!(registry.codec_by_name("a").unwrap().extensions(), &[".x", ".y"]);
        for file in ["f.x", "f.y"] {
            assert_eq!(registry.codec_by_extension(file).unwrap().name(), "a");
        }
        assert!(registry.codec_by_extension("f.z").is_err());
    }

    #[test]
    fn test_extension_collision_is_atomic() {
        let registry = CodecRegistry::new();
        registry.add_codec(NamedCodec::new("a", &[".x"])).unwrap();
        let err = registry
            .add_codec(NamedCodec::new("b", &[".w", ".x"]))
            .unwrap_err();
        assert!(matches!(err, Error::NameAlreadyRegistered(ref key) if key == ".x"));

        assert!(matches!(registry.codec_by_name("b"), Err(Error::CodecNotFound(_))));
        assert!(matches!(
            registry.codec_by_extension("f.w"),
            Err(Error::ExtensionNotRegistered(_))
        ));
        assert_eq!(registry.codec_by_extension("f.x").unwrap().name(), "a");

        // Duplicates inside one codec's own list
        assert!(registry.add_codec(NamedCodec::new("c", &[".q", "q"])).is_err());
        assert_eq!(registry.codec_names(), vec!["a"]);
    }

    #[test]
    fn test_remove_clears_extensions() {
        let registry = CodecRegistry::new();
        registry.add_codec(NamedCodec::new("a", &["x", ".y"])).unwrap();
        registry.add_codec(NamedCodec::new("b", &[".z"])).unwrap();
        registry.remove_codec_by_name("a").unwrap();

        assert!(matches!(registry.codec_by_name("a"), Err(Error::CodecNotFound(_))));
        for file in ["f.x", "f.y"] {
            assert!(matches!(
                registry.codec_by_extension(file),
                Err(Error::ExtensionNotRegistered(_))
            ));
        }
        assert_eq!(
            registry.registered_extensions(),
            vec![(".z".to_string(), "b".to_string())]
        );
        assert!(matches!(
            registry.remove_codec_by_name("a"),
            Err(Error::CodecNotFound(_))
        ));

        // Names and extensions become free again
        registry.add_codec(NamedCodec::new("a", &[".x"])).unwrap();
    }

    #[test]
    fn test_extension_lookup() {
        let registry = CodecRegistry::with_defaults(IoConfig::default());
        assert_eq!(
            registry.codec_by_extension("dir.v2/set.tar.bin").unwrap().name(),
            BinaryCodec::NAME
        );
        assert_eq!(
            registry.codec_by_extension("set.h5a").unwrap().name(),
            HierarchicalCodec::NAME
        );
        assert!(matches!(
            registry.codec_by_extension("README"),
            Err(Error::ExtensionNotRegistered(_))
        ));
        assert!(matches!(
            registry.codec_by_extension("image.png"),
            Err(Error::ExtensionNotRegistered(_))
        ));
    }

    #[test]
    fn test_load_save_dispatch() {
        let dir = tempfile::tempdir().unwrap();
        let registry = CodecRegistry::global();
        let set = Arrayset::from_arrays(vec![Array::from_vec(vec![1.5f32, 2.5]).unwrap()])
            .unwrap()
            .unwrap();

        for name in ["set.bin", "set.haf"] {
            let path = dir.path().join(name);
            registry.save(&path, &set).unwrap();
            assert_eq!(registry.load(&path).unwrap(), set);
            assert_eq!(registry.peek(&path).unwrap().n_samples, 1);
        }
    }
}
