#![allow(dead_code)]

pub use casparse::testlib::NonAutoCreatingTestDir;

pub fn run_test<T>(name: &str, test: T)
where
    T: FnOnce() + std::panic::UnwindSafe,
{
    println!("Running test: {}", name);
    let result = std::panic::catch_unwind(test);
    match result {
        Ok(_) => println!("{name} passed"),
        Err(e) => {
            panic!("{name} failed: {e:#?}");
        },
    }
}
