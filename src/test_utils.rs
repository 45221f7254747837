pub mod test_helpers {
    use std::collections::HashSet;
    use std::path::{Path, PathBuf};
    use std::sync::Mutex;
    use std::time::Duration;

    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    use crate::gallery::{Dispatcher, LoadError, LoadRequest, LoadResult, Loader, Picture};

    /// Dispatcher that only records requests; tests decide when and in
    /// which order they complete.
    #[derive(Default)]
    pub struct RecordingDispatcher {
        requests: Mutex<Vec<(usize, PathBuf)>>,
    }

    impl RecordingDispatcher {
        pub fn new() -> Self {
            Self::default()
        }

        /// Positions dispatched so far, in order
        pub fn positions(&self) -> Vec<usize> {
            self.requests
                .lock()
                .unwrap()
                .iter()
                .map(|(pos, _)| *pos)
                .collect()
        }

        pub fn requests(&self) -> Vec<(usize, PathBuf)> {
            self.requests.lock().unwrap().clone()
        }

        pub fn count(&self) -> usize {
            self.requests.lock().unwrap().len()
        }
    }

    impl Dispatcher for RecordingDispatcher {
        fn submit(&self, request: LoadRequest) {
            if let LoadRequest::Load { pos, path } = request {
                self.requests.lock().unwrap().push((pos, path));
            }
        }
    }

    /// Loader that fabricates a picture from the file name instead of decoding.
    ///
    /// `N.ext` becomes an `(N+1) x 1` picture whose red channel is `N`, so
    /// tests can tell payloads apart. Names listed in `failing` produce a
    /// decode error.
    #[derive(Default)]
    pub struct StubLoader {
        pub failing: HashSet<String>,
        pub delay: Option<Duration>,
    }

    impl StubLoader {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn failing(mut self, name: &str) -> Self {
            self.failing.insert(name.to_string());
            self
        }

        pub fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = Some(delay);
            self
        }
    }

    impl Loader for StubLoader {
        fn load(&self, path: &Path) -> LoadResult {
            if let Some(delay) = self.delay {
                std::thread::sleep(delay);
            }
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            if self.failing.contains(&name) {
                return Err(LoadError::Decode {
                    path: path.to_path_buf(),
                    detail: "stub failure".to_string(),
                });
            }
            let n: u32 = path
                .file_stem()
                .and_then(|s| s.to_str())
                .and_then(|s| s.parse().ok())
                .unwrap_or(0);
            Ok(stub_picture(n))
        }
    }

    /// The picture `StubLoader` produces for `N.ext`
    pub fn stub_picture(n: u32) -> Picture {
        Picture::solid(n + 1, 1, [(n % 256) as u8, 0, 0])
    }

    /// `000.jpg`, `001.jpg`, ... as a path list
    pub fn numbered_paths(count: usize) -> Vec<PathBuf> {
        (0..count).map(|i| PathBuf::from(format!("{i:03}.jpg"))).collect()
    }

    /// Write `count` real PNG files of the given size into `dir`
    pub fn write_test_pictures(dir: &Path, count: usize, width: u32, height: u32) -> Vec<PathBuf> {
        (0..count)
            .map(|i| {
                let path = dir.join(format!("{i:03}.png"));
                let img = image::RgbImage::from_fn(width, height, |x, _| {
                    image::Rgb([(i % 256) as u8, (x % 256) as u8, 128])
                });
                img.save(&path).unwrap();
                path
            })
            .collect()
    }

    /// Create a test terminal with the specified dimensions
    pub fn create_test_terminal(width: u16, height: u16) -> Terminal<TestBackend> {
        let backend = TestBackend::new(width, height);
        Terminal::new(backend).unwrap()
    }
}
