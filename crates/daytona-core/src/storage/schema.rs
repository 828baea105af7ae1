// Foreign keys carry no ON DELETE CASCADE: dependents are removed by persist::cascade.
pub const DDL: &str = r#"
CREATE TABLE IF NOT EXISTS frameworks (
  framework_id INTEGER PRIMARY KEY AUTOINCREMENT,
  framework_name TEXT NOT NULL UNIQUE,
  framework_owner TEXT NOT NULL,
  title TEXT,
  purpose TEXT,
  product_name TEXT,
  execution_script_location TEXT NOT NULL,
  default_timeout INTEGER NOT NULL DEFAULT 0,
  argument_passing_format TEXT,
  creation_time TEXT NOT NULL,
  last_modified TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS framework_arguments (
  framework_arg_id INTEGER PRIMARY KEY AUTOINCREMENT,
  framework_id INTEGER NOT NULL REFERENCES frameworks(framework_id),
  argument_name TEXT NOT NULL,
  argument_default TEXT,
  argument_values TEXT,
  argument_description TEXT,
  widget_type TEXT,
  argument_order INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS framework_grants (
  username TEXT NOT NULL,
  framework_id INTEGER NOT NULL REFERENCES frameworks(framework_id),
  administrator INTEGER NOT NULL DEFAULT 0,
  PRIMARY KEY (username, framework_id)
);

CREATE TABLE IF NOT EXISTS host_association_types (
  host_association_type_id INTEGER PRIMARY KEY AUTOINCREMENT,
  framework_id INTEGER NOT NULL REFERENCES frameworks(framework_id),
  name TEXT NOT NULL,
  default_value TEXT,
  execution INTEGER NOT NULL DEFAULT 0,
  statistics INTEGER NOT NULL DEFAULT 0,
  UNIQUE (framework_id, name)
);

CREATE TABLE IF NOT EXISTS test_result_files (
  test_result_file_id INTEGER PRIMARY KEY AUTOINCREMENT,
  framework_id INTEGER NOT NULL REFERENCES frameworks(framework_id),
  filename TEXT NOT NULL,
  filename_order INTEGER NOT NULL,
  title TEXT
);

CREATE TABLE IF NOT EXISTS tests (
  test_id INTEGER PRIMARY KEY AUTOINCREMENT,
  framework_id INTEGER NOT NULL REFERENCES frameworks(framework_id),
  username TEXT NOT NULL,
  title TEXT,
  purpose TEXT,
  priority INTEGER,
  timeout INTEGER NOT NULL DEFAULT 0,
  cc_list TEXT,
  end_status TEXT NOT NULL,
  start_time TEXT,
  end_time TEXT,
  creation_time TEXT NOT NULL,
  modified TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS test_arguments (
  test_arg_id INTEGER PRIMARY KEY AUTOINCREMENT,
  test_id INTEGER NOT NULL REFERENCES tests(test_id),
  framework_arg_id INTEGER NOT NULL REFERENCES framework_arguments(framework_arg_id),
  argument_value TEXT
);

CREATE TABLE IF NOT EXISTS imported_test_arguments (
  imported_test_arg_id INTEGER PRIMARY KEY AUTOINCREMENT,
  test_id INTEGER NOT NULL REFERENCES tests(test_id),
  argument_name TEXT NOT NULL,
  argument_value TEXT
);

CREATE TABLE IF NOT EXISTS host_associations (
  host_association_id INTEGER PRIMARY KEY AUTOINCREMENT,
  host_association_type_id INTEGER NOT NULL REFERENCES host_association_types(host_association_type_id),
  test_id INTEGER NOT NULL REFERENCES tests(test_id),
  hostname TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS profiler_configs (
  profiler_config_id INTEGER PRIMARY KEY AUTOINCREMENT,
  test_id INTEGER NOT NULL REFERENCES tests(test_id),
  profiler TEXT NOT NULL,
  processname TEXT,
  delay INTEGER NOT NULL,
  duration INTEGER NOT NULL,
  UNIQUE (test_id, profiler)
);

CREATE TABLE IF NOT EXISTS scheduler_queue (
  queue_id INTEGER PRIMARY KEY AUTOINCREMENT,
  test_id INTEGER NOT NULL REFERENCES tests(test_id),
  state TEXT NOT NULL,
  pid INTEGER NOT NULL DEFAULT 0
);

CREATE INDEX IF NOT EXISTS idx_framework_arguments_framework ON framework_arguments(framework_id, argument_order);
CREATE INDEX IF NOT EXISTS idx_tests_framework ON tests(framework_id);
CREATE INDEX IF NOT EXISTS idx_test_arguments_test ON test_arguments(test_id);
CREATE INDEX IF NOT EXISTS idx_host_associations_test ON host_associations(test_id);
"#;

/// Tables that `Store::count_rows` may be asked about.
pub const TABLES: &[&str] = &[
    "frameworks",
    "framework_arguments",
    "framework_grants",
    "host_association_types",
    "test_result_files",
    "tests",
    "test_arguments",
    "imported_test_arguments",
    "host_associations",
    "profiler_configs",
    "scheduler_queue",
];
