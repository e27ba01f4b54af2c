//! WriterPool tests: capacity bound, LRU order, reopen behavior

mod test_data_gen;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use csvpool::{PoolConfig, Row, WriterPool};
use test_data_gen::{count_boms, keyed_row, lcg_sequence, positional_row, read_records, read_text};

fn paths(dir: &Path, names: &[&str]) -> Vec<PathBuf> {
    names.iter().map(|n| dir.join(n)).collect()
}

#[test]
fn test_open_writers_never_exceed_capacity() {
    let dir = tempfile::tempdir().unwrap();
    let capacity = 7;
    let mut pool = WriterPool::with_capacity(capacity).unwrap();

    let targets: Vec<PathBuf> = (0..40).map(|i| dir.path().join(format!("p{i:02}.csv"))).collect();
    let mut expected: HashMap<PathBuf, Vec<String>> = HashMap::new();

    for (n, idx) in lcg_sequence(42, 2_000, targets.len()).into_iter().enumerate() {
        let path = &targets[idx];
        pool.write(path, &positional_row(n)).unwrap();
        expected.entry(path.clone()).or_default().push(n.to_string());

        assert!(pool.len() <= capacity, "pool holds {} writers", pool.len());
        assert_eq!(pool.recency().len(), pool.len());
    }

    let stats = pool.stats();
    assert!(stats.peak_open <= capacity);
    assert_eq!(stats.rows_written, 2_000);
    assert_eq!(stats.opened - stats.evicted, pool.len() as u64);
    pool.close_all().unwrap();

    // Per-path order is call order, across any number of reopenings.
    for (path, ids) in expected {
        let got: Vec<String> = read_records(&path, b',')
            .into_iter()
            .map(|r| r[0].clone())
            .collect();
        assert_eq!(got, ids, "rows out of order in {}", path.display());
        assert_eq!(count_boms(&path), 1);
    }
}

#[test]
fn test_lru_evicts_least_recently_used() {
    let dir = tempfile::tempdir().unwrap();
    let p = paths(dir.path(), &["a.csv", "b.csv", "c.csv"]);
    let (a, b, c) = (&p[0], &p[1], &p[2]);
    let mut pool = WriterPool::with_capacity(2).unwrap();

    pool.write(a, &positional_row(1)).unwrap();
    pool.write(b, &positional_row(2)).unwrap();
    pool.write(a, &positional_row(3)).unwrap();
    pool.write(c, &positional_row(4)).unwrap();

    assert!(!pool.contains(b));
    assert_eq!(pool.recency(), vec![a.as_path(), c.as_path()]);
    assert_eq!(pool.stats().evicted, 1);

    // B comes back as a brand-new writer, evicting A.
    pool.write(b, &positional_row(5)).unwrap();
    assert_eq!(pool.writer(b).unwrap().rows_written(), 1);
    assert_eq!(pool.recency(), vec![c.as_path(), b.as_path()]);

    pool.close_all().unwrap();
    assert_eq!(read_records(b, b',').len(), 2);
}

#[test]
fn test_hit_touches_recency() {
    let dir = tempfile::tempdir().unwrap();
    let p = paths(dir.path(), &["x.csv", "y.csv", "z.csv"]);
    let mut pool = WriterPool::with_capacity(3).unwrap();

    for path in &p {
        pool.write(path, &positional_row(0)).unwrap();
    }
    pool.write(&p[0], &positional_row(1)).unwrap();
    assert_eq!(
        pool.recency(),
        vec![p[1].as_path(), p[2].as_path(), p[0].as_path()]
    );
    assert_eq!(pool.stats().evicted, 0);
}

#[test]
fn test_eviction_churn_repeats_header() {
    let dir = tempfile::tempdir().unwrap();
    let x = dir.path().join("x.csv");
    let y = dir.path().join("y.csv");
    let cfg = PoolConfig::new(1).with_header(true);
    let mut pool = WriterPool::new(cfg).unwrap();

    pool.write(&x, &Row::keyed([("a", 1), ("b", 2)])).unwrap();
    pool.write(&y, &Row::keyed([("a", 1), ("b", 2)])).unwrap();
    pool.write(&x, &Row::keyed([("a", 3), ("b", 4)])).unwrap();
    pool.close_all().unwrap();

    assert_eq!(read_text(&x), "\u{feff}a,b\n1,2\na,b\n3,4\n");
    assert_eq!(read_text(&y), "\u{feff}a,b\n1,2\n");
}

#[test]
fn test_write_after_close_all_reopens() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("again.csv");
    let mut pool = WriterPool::with_capacity(4).unwrap();

    pool.write(&path, &keyed_row(1)).unwrap();
    pool.close_all().unwrap();
    assert!(pool.is_empty());
    assert!(pool.recency().is_empty());

    pool.write(&path, &keyed_row(2)).unwrap();
    let w = pool.writer(&path).unwrap();
    assert!(w.marker_emitted(), "file already has content");
    assert!(w.header_emitted());
    pool.close_all().unwrap();

    let records = read_records(&path, b',');
    assert_eq!(
        records,
        vec![
            vec!["id", "name", "score"],
            vec!["1", "name_1", "0.5"],
            vec!["id", "name", "score"],
            vec!["2", "name_2", "1"],
        ]
    );
    assert_eq!(count_boms(&path), 1);
}

#[test]
fn test_close_all_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let mut pool = WriterPool::with_capacity(2).unwrap();
    pool.close_all().unwrap();

    pool.write(dir.path().join("one.csv"), &positional_row(1)).unwrap();
    pool.close_all().unwrap();
    pool.close_all().unwrap();
    assert_eq!(pool.len(), 0);
}

#[test]
fn test_flush_all_makes_rows_visible() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("flushed.csv");
    let mut pool = WriterPool::with_capacity(2).unwrap();

    pool.write(&path, &positional_row(1)).unwrap();
    pool.write(&path, &positional_row(2)).unwrap();
    pool.flush_all().unwrap();

    assert_eq!(read_records(&path, b',').len(), 2);
    assert!(pool.contains(&path));
}

#[test]
fn test_drop_closes_writers() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dropped.csv");
    {
        let mut pool = WriterPool::with_capacity(2).unwrap();
        pool.write(&path, &keyed_row(9)).unwrap();
    }
    assert_eq!(read_records(&path, b',').len(), 2);
}

#[test]
fn test_custom_delimiter_from_config() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tabs.tsv");
    let cfg: PoolConfig =
        serde_yaml::from_str("max_open_files: 3\nwrite_header: false\ndelimiter: tab\n").unwrap();
    let mut pool = WriterPool::new(cfg).unwrap();

    pool.write(&path, &keyed_row(4)).unwrap();
    pool.close_all().unwrap();

    assert_eq!(read_text(&path), "\u{feff}4\tname_4\t2\n");
}

#[test]
fn test_rows_from_json() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("json.csv");
    let mut pool = WriterPool::with_capacity(2).unwrap();

    let row = Row::from_json(&serde_json::json!({"city": "Oslo, NO", "pop": 709000, "capital": true}))
        .unwrap();
    pool.write(&path, &row).unwrap();
    pool.close_all().unwrap();

    assert_eq!(
        read_records(&path, b','),
        vec![vec!["city", "pop", "capital"], vec!["Oslo, NO", "709000", "true"]]
    );
}

#[test]
fn test_shared_behind_mutex() {
    use std::sync::{Arc, Mutex};

    let dir = tempfile::tempdir().unwrap();
    let pool = Arc::new(Mutex::new(WriterPool::with_capacity(2).unwrap()));
    let handles: Vec<_> = (0..4)
        .map(|t| {
            let pool = Arc::clone(&pool);
            let path = dir.path().join(format!("t{t}.csv"));
            std::thread::spawn(move || {
                for i in 0..25 {
                    pool.lock().unwrap().write(&path, &positional_row(i)).unwrap();
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }
    pool.lock().unwrap().close_all().unwrap();

    for t in 0..4 {
        let records = read_records(&dir.path().join(format!("t{t}.csv")), b',');
        assert_eq!(records.len(), 25);
        assert_eq!(records[24][0], "24");
    }
}
