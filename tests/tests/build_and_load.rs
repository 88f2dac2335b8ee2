use serde_json::Value;
use std::{collections::BTreeSet, fs, path::Path};
use test_case::test_case;
use vendor_compress::{
    config::Config, filter::FileFilter, processor::FileProcessor, resolve::resolve,
};
use vendor_compress_common::compression::CompressionMethod;
use vendor_compress_loader::loader::{load_compressed_file, load_file};
use vendor_compress_tests::{
    build, build_and_load_vendor_fixture_cached, tree_write, vendor_fixture_path,
};

#[test]
fn loader_reads_what_builder_wrote() {
    let (_output, container) = build(&vendor_fixture_path(), &Config::default()).unwrap();
    let phar = load_file(container.path()).unwrap();

    assert_eq!(phar.count(), container.count());
    assert_eq!(phar.alias, "vendor.phar");
    assert_eq!(phar.stub, container.phar().stub);

    // zip values and check if they are equal
    phar.entries_by_path
        .iter()
        .for_each(|(entry_path, entry)| {
            let expected = container.get(entry_path).unwrap();
            assert_eq!(entry.content, expected.content, "{entry_path}");
            assert_eq!(entry.timestamp, expected.timestamp);
            assert_eq!(entry.permissions, 0o644);
        });
}

#[test]
fn default_config_packs_every_file() {
    let phar = build_and_load_vendor_fixture_cached();

    assert_eq!(phar.count(), 20);
    assert!(phar.get("autoload.php").is_some());
    assert!(phar.get("composer/installed.json").is_some());
    assert!(phar.get("vendor-name-1/package-1-1/tests/FooTest.php").is_some());

    // untouched files are byte identical
    assert_eq!(
        &*phar
            .get("vendor-name-2/package-2-1/README.txt")
            .unwrap()
            .content,
        fs::read(vendor_fixture_path().join("vendor-name-2/package-2-1/README.txt"))
            .unwrap()
            .as_slice()
    );
}

#[test]
fn stub_mounts_and_requires_autoload() {
    let phar = build_and_load_vendor_fixture_cached();

    assert!(phar.stub.starts_with("<?php\ndeclare(strict_types=1);"));
    assert!(phar.stub.contains(&format!("@version {}", vendor_compress::stub::VERSION)));
    assert!(phar.stub.contains("\\Phar::interceptFileFuncs();"));
    assert!(phar.stub.contains(
        "return require_once 'phar://' . __FILE__ . DIRECTORY_SEPARATOR . 'autoload.php';"
    ));
    assert!(phar.stub.ends_with("__HALT_COMPILER();"));
}

#[test_case("composer/autoload_classmap.php")]
#[test_case("composer/autoload_files.php")]
#[test_case("composer/autoload_namespaces.php")]
#[test_case("composer/autoload_psr4.php")]
fn base_dir_points_at_mount(path: &str) {
    let phar = build_and_load_vendor_fixture_cached();
    let content = String::from_utf8(phar.get(path).unwrap().content.to_vec()).unwrap();

    assert!(content.contains("\n$baseDir=\\Phar::running(true).'/.mount';\n"));
    assert!(!content.contains("dirname($vendorDir)"));
    assert!(content.contains("$vendorDir = dirname(__DIR__);"));
}

#[test]
fn static_loader_points_at_mount() {
    let phar = build_and_load_vendor_fixture_cached();
    let content = String::from_utf8(
        phar.get("composer/autoload_static.php")
            .unwrap()
            .content
            .to_vec(),
    )
    .unwrap();

    assert!(content.contains(
        "namespace Composer\\Autoload;\n\ndefine('PHAR_RUNNING',\\Phar::running(true).'/.mount');\n"
    ));
    assert!(content.contains("=> PHAR_RUNNING . '/app/helpers.php',"));
    assert!(content.contains("0 => PHAR_RUNNING . '/app',"));
    assert!(!content.contains("'/../..'"));
    // vendor paths stay relative to the autoloader
    assert!(content.contains("0 => __DIR__ . '/..' . '/vendor-name-1/package-1-1/src',"));
}

#[test]
fn excluded_files_are_missing() {
    // a.json, b.php, vendor/acme/pkg/c.txt
    let project = tempfile::tempdir().unwrap();
    let vendor = project.path().join("vendor");
    tree_write(
        &vendor,
        &[
            ("a.json", "{\"a\": 1}"),
            ("b.php", "<?php echo 1;"),
            ("vendor/acme/pkg/c.txt", "c"),
        ],
    )
    .unwrap();

    let mut config = Config::default();
    config.excluded_add(FileFilter::extension("txt"));

    let (_output, container) = build(&vendor, &config).unwrap();
    let phar = load_file(container.path()).unwrap();

    assert_eq!(
        phar.entries_by_path
            .keys()
            .map(|entry_path| &**entry_path)
            .collect::<Vec<_>>(),
        vec!["a.json", "b.php"]
    );
}

#[test]
fn included_entries_override_excludes() {
    let mut config = Config::default();
    config
        .excluded_add(FileFilter::is_directory(FileFilter::basename("tests")))
        .excluded_add(FileFilter::is_directory(FileFilter::basename("docs")))
        .excluded_add(FileFilter::extension("md"))
        .excluded_add(FileFilter::basename("phpunit.xml"))
        .included_add(FileFilter::vendor_package(
            "vendor-name-1",
            Some("package-1-1".to_owned()),
        ));

    let (_output, container) = build(&vendor_fixture_path(), &config).unwrap();
    let phar = load_file(container.path()).unwrap();

    // tests directory of package-1-1 is re-included as a directory, files
    // inside are not excluded by anything
    assert!(phar.get("vendor-name-1/package-1-1/tests/FooTest.php").is_some());
    // vendor package filter never matches files
    assert!(phar.get("vendor-name-1/package-1-1/phpunit.xml").is_none());
    assert!(phar.get("vendor-name-1/package-1-2/README.md").is_none());
    assert!(phar.get("vendor-name-2/package-2-1/docs/index.md").is_none());
    assert!(phar.get("vendor-name-2/package-2-1/README.txt").is_some());
    assert_eq!(phar.count(), 17);
}

#[test]
fn json_is_minified() {
    let mut config = Config::default();
    config.file_processor_add(FileProcessor::MinifyJson, [FileFilter::extension("json")]);

    let (_output, container) = build(&vendor_fixture_path(), &config).unwrap();
    let phar = load_file(container.path()).unwrap();

    for path in [
        "composer/installed.json",
        "vendor-name-1/package-1-1/composer.json",
    ] {
        let source = fs::read(vendor_fixture_path().join(path)).unwrap();
        let packed = &phar.get(path).unwrap().content;

        assert!(packed.len() < source.len(), "{path} was not minified");
        assert_eq!(
            serde_json::from_slice::<Value>(packed).unwrap(),
            serde_json::from_slice::<Value>(&source).unwrap()
        );
    }

    // not matched by the filter
    assert_eq!(
        &*phar.get("vendor-name-1/package-1-1/phpunit.xml").unwrap().content,
        fs::read(vendor_fixture_path().join("vendor-name-1/package-1-1/phpunit.xml"))
            .unwrap()
            .as_slice()
    );
}

#[test]
fn php_is_stripped() {
    let mut config = Config::default();
    config.file_processor_add(
        FileProcessor::StripWhitespacesPhp,
        [FileFilter::extension("php")],
    );

    let (_output, container) = build(&vendor_fixture_path(), &config).unwrap();
    let phar = load_file(container.path()).unwrap();

    let content = String::from_utf8(
        phar.get("vendor-name-1/package-1-1/src/Foo.php")
            .unwrap()
            .content
            .to_vec(),
    )
    .unwrap();
    assert!(content.starts_with("<?php\n"));
    assert!(!content.contains("// greeting template"));
    assert!(!content.contains("# spaces inside"));
    assert!(!content.contains("/**"));
    assert!(content.contains("\"Hello,   %s!\""));

    // stripping runs before autoload rewriting, which still applies
    let content = String::from_utf8(
        phar.get("composer/autoload_psr4.php")
            .unwrap()
            .content
            .to_vec(),
    )
    .unwrap();
    assert!(content.contains("$baseDir=\\Phar::running(true).'/.mount';"));
}

#[test]
fn rebuild_is_deterministic() {
    let mut config = Config::default();
    config
        .excluded_add(FileFilter::extension("md"))
        .file_processor_add(FileProcessor::MinifyJson, [FileFilter::extension("json")])
        .file_processor_add(
            FileProcessor::StripWhitespacesPhp,
            [FileFilter::extension("php")],
        );

    let (_output_1, container_1) = build(&vendor_fixture_path(), &config).unwrap();
    let (_output_2, container_2) = build(&vendor_fixture_path(), &config).unwrap();

    let phar_1 = load_file(container_1.path()).unwrap();
    let phar_2 = load_file(container_2.path()).unwrap();

    assert_eq!(
        phar_1.entries_by_path.keys().collect::<BTreeSet<_>>(),
        phar_2.entries_by_path.keys().collect::<BTreeSet<_>>()
    );
    for (entry_path, entry) in &phar_1.entries_by_path {
        assert_eq!(entry.content, phar_2.get(entry_path).unwrap().content);
    }
}

#[test_case(CompressionMethod::Gzip; "gzip")]
#[test_case(CompressionMethod::Bzip2; "bzip2")]
fn compressed_entries_load(method: CompressionMethod) {
    let mut config = Config::default();
    config.files_compression = method;

    let (_output, container) = build(&vendor_fixture_path(), &config).unwrap();
    let phar = load_file(container.path()).unwrap();

    let uncompressed = build_and_load_vendor_fixture_cached();
    assert_eq!(phar.count(), uncompressed.count());
    for (entry_path, entry) in &phar.entries_by_path {
        assert_eq!(entry.compression, method);
        assert_eq!(entry.content, uncompressed.get(entry_path).unwrap().content);
    }
    assert!(fs::metadata(container.path()).unwrap().len() > 0);
}

#[test_case(CompressionMethod::Gzip, "vendor.phar.gz"; "gzip")]
#[test_case(CompressionMethod::Bzip2, "vendor.phar.bz2"; "bzip2")]
fn compressed_archive_loads(
    method: CompressionMethod,
    file_name: &str,
) {
    let mut config = Config::default();
    config.archive_compression = method;

    let (output, container) = build(&vendor_fixture_path(), &config).unwrap();

    let compressed_path = container.compressed_path().unwrap();
    assert_eq!(compressed_path, output.path().canonicalize().unwrap().join(file_name));

    // primary archive is kept as is
    let phar = load_file(container.path()).unwrap();
    let phar_compressed = load_compressed_file(compressed_path, method).unwrap();
    assert_eq!(phar, phar_compressed);
}

#[test]
fn missing_vendor_directory_fails() {
    let project = tempfile::tempdir().unwrap();
    let error = resolve(
        Path::new("vendor"),
        Path::new("vendor.phar"),
        project.path(),
    )
    .unwrap_err();

    assert!(format!("{error:#}").contains("vendor path does not exist or is inaccessible"));
}

#[test]
fn corrupted_archive_is_rejected() {
    let (_output, container) = build(&vendor_fixture_path(), &Config::default()).unwrap();

    let mut data = fs::read(container.path()).unwrap();
    let middle = data.len() / 2;
    data[middle] ^= 0xff;

    assert!(vendor_compress_loader::loader::load(&data).is_err());
}
