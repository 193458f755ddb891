mod common;

use fat::{BLOCK_SIZE, leaf_name};
use quickcheck::{QuickCheck, TestResult};
use quickcheck_macros::quickcheck;

use self::common::{bytes, volume};

#[quickcheck]
fn leaf_is_last_component(cmps: Vec<String>, absolute: bool) -> bool {
    let cmps: Vec<String> = cmps.into_iter().map(|cmp| cmp.replace('/', "")).collect();
    let mut path = cmps.join("/");
    if absolute {
        path.insert(0, '/');
    }
    leaf_name(&path) == cmps.last().map_or("", String::as_str)
}

#[test]
fn created_content_reads_back() {
    fn property(lines: Vec<String>) -> TestResult {
        let lines: Vec<String> = lines.into_iter().take_while(|line| !line.is_empty()).collect();
        let expected = bytes(&lines);

        let (_, mut fs) = volume(64);
        let free = fs.free_blocks();
        if fs.create("f", &lines).is_err() {
            return TestResult::failed();
        }
        let used = free - fs.free_blocks();
        let read = fs.cat("f");
        if fs.rm("f").is_err() {
            return TestResult::failed();
        }

        TestResult::from_bool(
            read == Ok(expected.clone())
                && used == expected.len().div_ceil(BLOCK_SIZE)
                && free == fs.free_blocks(),
        )
    }

    let mut qc = QuickCheck::new().tests(50);
    qc.quickcheck(property as fn(Vec<String>) -> TestResult);
}

#[test]
fn copies_match_their_source() {
    fn property(lines: Vec<String>) -> TestResult {
        let lines: Vec<String> = lines.into_iter().take_while(|line| !line.is_empty()).collect();
        if lines.is_empty() {
            return TestResult::discard();
        }

        let (_, mut fs) = volume(64);
        if fs.create("src", &lines).and_then(|()| fs.cp("src", "dst")).is_err() {
            return TestResult::failed();
        }
        TestResult::from_bool(fs.cat("src") == fs.cat("dst") && fs.cat("src") == Ok(bytes(&lines)))
    }

    let mut qc = QuickCheck::new().tests(30);
    qc.quickcheck(property as fn(Vec<String>) -> TestResult);
}
