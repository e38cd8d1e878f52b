use querylab_core::config::LayeredConfig;
use std::fs;
use std::path::Path;

/// Write a small judged collection under `root` and a config file that
/// declares it as dataset `sample`. Returns the config loaded from that file.
pub fn sample_config(root: &Path, index_mode: &str) -> LayeredConfig {
    fs::write(
        root.join("collection.tsv"),
        "doc-1\thow to boil rice on the stove\n\
         doc-2\trice cookers make fluffy rice every time\n\
         doc-3\twhy is the sky blue during the day\n\
         doc-4\tsunsets turn the sky red and orange\n\
         doc-5\ttips for keeping houseplants alive\n\
         doc-6\twatering schedule for indoor plants\n",
    )
    .unwrap();
    fs::write(
        root.join("queries.tsv"),
        "101\tcooking rice\n102\tsky colour\n103\thouseplant care\n104\toffensive question\n",
    )
    .unwrap();
    fs::write(
        root.join("test.qrel"),
        "101 U0 doc-1 3\n101 U0 doc-2 4\n102 U0 doc-3 4\n102 U0 doc-4 2\n\
         103 U0 doc-5 3\n103 U0 doc-6 3\n104 U0 doc-1 1\n",
    )
    .unwrap();
    fs::write(root.join("offensive.txt"), "104\n").unwrap();

    let config = format!(
        "dataset = \"sample\"\n\
         index_mode = \"{mode}\"\n\
         index_path = \"{index}\"\n\
         top_k = 3\n\
         \n\
         [datasets.sample]\n\
         root = \"{root}\"\n\
         corpus = \"collection.tsv\"\n\
         topics = \"queries.tsv\"\n\
         qrels = \"test.qrel\"\n\
         exclude_topics = \"offensive.txt\"\n",
        mode = index_mode,
        index = root.join("index").display(),
        root = root.display(),
    );
    let config_path = root.join("querylab.toml");
    fs::write(&config_path, config).unwrap();

    LayeredConfig::with_defaults().load_from_file(&config_path).unwrap()
}
