use std::{
    fmt::Debug,
    fs,
    path::{Path, PathBuf},
    sync::atomic::{AtomicU32, Ordering},
};

use regex::Regex;

pub fn assert_re(pattern: &str, haystack: &str) {
    let re = Regex::new(pattern).unwrap();
    assert!(re.is_match(haystack), "{:?} did not match {:?}", haystack, re);
}

/// assert_eq, but with both sides pretty-printed, which is much easier
/// to read for nested statement structures.
pub fn assert_big_struct_eq<T: PartialEq + Debug>(left: T, right: T) {
    assert_eq!(left, right, "{:#?} != {:#?}", left, right);
}

/// Compares element by element, printing every mismatching index before
/// failing.
pub fn assert_vec_eq<T: PartialEq + Debug>(left: Vec<T>, right: Vec<T>) {
    if left == right {
        return;
    }

    eprintln!("left != right. left: {:#?}\nright: {:#?}", left, right);
    if left.len() != right.len() {
        panic!("size of left ({}) != size of right ({})", left.len(), right.len());
    }
    for (i, (l, r)) in left.iter().zip(right.iter()).enumerate() {
        if l != r {
            eprintln!("Mismatch at index {i}:\nleft: {l:#?} != right: {r:#?}");
        }
    }
    panic!("left != right");
}

/// Compares two JSON documents by content, ignoring layout.
pub fn assert_json_eq(left: &str, right: &str) {
    let parse = |s: &str| -> serde_json::Value {
        serde_json::from_str(s).unwrap_or_else(|e| panic!("Invalid JSON ({e}): {s}"))
    };
    assert_big_struct_eq(parse(left), parse(right));
}

// MARK: test directories

fn env_var_non_empty(name: &str) -> bool {
    match std::env::var(name) {
        Ok(v) => !v.is_empty(),
        Err(_) => false,
    }
}

fn test_temp_dir_path() -> PathBuf {
    static NEXT_ID: AtomicU32 = AtomicU32::new(1);
    let tmpdir = std::env::temp_dir();

    loop {
        let val = NEXT_ID.fetch_add(1, Ordering::Relaxed);
        if val >= 1000000 {
            panic!("Could not create temp directory path that does not already exist");
        }
        let fname = format!("casparse-test-{}-{}", std::process::id(), val);
        let path = tmpdir.join(fname);
        if !path.exists() {
            return path;
        }
    }
}

/// A temp directory path, which is only created once a file is written into
/// it. Removed on drop, unless SKIP_TEMP_DIR_CLEANUP_ON_FAIL is set and the
/// test is failing.
pub struct NonAutoCreatingTestDir {
    pub path: PathBuf,
}

impl NonAutoCreatingTestDir {
    pub fn new() -> NonAutoCreatingTestDir {
        NonAutoCreatingTestDir { path: test_temp_dir_path() }
    }

    /// Creates the directory, and writes a file into it.
    pub fn write_file(&self, name: &str, content: &[u8]) -> PathBuf {
        fs::create_dir_all(&self.path).unwrap();
        let fpath = self.path.join(name);
        fs::write(&fpath, content).unwrap();
        fpath
    }
}

fn cleanup_test_dir(path: &PathBuf) {
    if !path.exists() {
        return;
    }
    let skip_env_var = "SKIP_TEMP_DIR_CLEANUP_ON_FAIL";
    if std::thread::panicking() && env_var_non_empty(skip_env_var) {
        println!("cleanup_test_dir: panicking. Skipping remove of {}", path.display());
    } else {
        println!(
            "cleanup_test_dir: removing {}. To skip cleanup, set {}",
            path.display(),
            skip_env_var
        );
        let _ = fs::remove_dir_all(path);
    }
}

impl Drop for NonAutoCreatingTestDir {
    fn drop(&mut self) {
        cleanup_test_dir(&self.path);
    }
}

// MARK: PDFs

/// Writes an empty single-page document whose trailer claims it is encrypted
/// with the standard security handler at the given /V and /R.
///
/// The owner and user keys are arbitrary, so no password will open it. This
/// is enough to drive a reader into its decryption path.
#[cfg(feature = "pdf_parse")]
pub fn write_encrypted_pdf_stub(path: &Path, version: i64, revision: i64) {
    use lopdf::{dictionary, Document, Object};

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let key_len: i64 = if version == 1 { 40 } else { 128 };
    doc.trailer.set(
        "Encrypt",
        dictionary! {
            "Filter" => "Standard",
            "V" => version,
            "R" => revision,
            "Length" => key_len,
            "O" => Object::string_literal(vec![0x4fu8; 32]),
            "U" => Object::string_literal(vec![0x55u8; 32]),
            "P" => -4i64,
        },
    );
    doc.trailer.set(
        "ID",
        vec![
            Object::string_literal(vec![0x01u8; 16]),
            Object::string_literal(vec![0x01u8; 16]),
        ],
    );
    doc.save(path).unwrap();
}
