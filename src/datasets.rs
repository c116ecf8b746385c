//! Static registry of downloadable encyclopedia datasets.
//!
//! Three fixed packages are offered, trading size against coverage. The
//! descriptors are immutable process-wide configuration; `wdx datasets`
//! prints them and `wdx ingest <key>` resolves one.

/// Description of one downloadable dump package.
#[derive(Debug, Clone, Copy)]
pub struct DatasetDescriptor {
    pub key: &'static str,
    pub display_name: &'static str,
    pub source_url: &'static str,
    pub approx_size_mb: u64,
    pub approx_article_count: u64,
    pub description: &'static str,
}

/// The fixed dataset registry.
pub const DATASETS: &[DatasetDescriptor] = &[
    DatasetDescriptor {
        key: "minimal",
        display_name: "Simple English Wikipedia (abstracts)",
        source_url:
            "https://dumps.wikimedia.org/simplewiki/latest/simplewiki-latest-abstract.xml.gz",
        approx_size_mb: 40,
        approx_article_count: 50_000,
        description: "Article abstracts only; fastest to ingest, good for quick answers",
    },
    DatasetDescriptor {
        key: "standard",
        display_name: "Simple English Wikipedia (full text)",
        source_url: "https://dumps.wikimedia.org/other/cirrussearch/current/simplewiki-20240101-cirrussearch-content.json.gz",
        approx_size_mb: 300,
        approx_article_count: 250_000,
        description: "Complete simplified-English articles with categories and links",
    },
    DatasetDescriptor {
        key: "full",
        display_name: "English Wikipedia (full text)",
        source_url: "https://dumps.wikimedia.org/other/cirrussearch/current/enwiki-20240101-cirrussearch-content.json.gz",
        approx_size_mb: 40_000,
        approx_article_count: 6_800_000,
        description: "Complete English Wikipedia; very large download",
    },
];

/// Look up a descriptor by key.
pub fn lookup(key: &str) -> Option<&'static DatasetDescriptor> {
    DATASETS.iter().find(|d| d.key == key)
}

/// Print the registry for `wdx datasets`.
pub fn list_datasets() {
    println!("Available datasets:");
    for d in DATASETS {
        println!();
        println!("{}:", d.key);
        println!("  Name:        {}", d.display_name);
        println!("  Size:        ~{} MB", d.approx_size_mb);
        println!("  Articles:    ~{}", d.approx_article_count);
        println!("  Description: {}", d.description);
    }
}
