#![allow(dead_code)]

pub mod test_server {
    use dogs_api::app;
    use dogs_api::config::AppConfig;
    use dogs_api::runtime_config::RuntimeConfig;
    use dogs_api::server::{HttpServer, ServerHandle};
    use dogs_api::store::{DogStore, MemoryDogStore};
    use std::net::{SocketAddr, TcpListener};
    use std::sync::{Arc, Once};

    /// Ensures May coroutines are configured only once
    static MAY_INIT: Once = Once::new();

    pub const TEST_STACK_SIZE: usize = 0x8000;

    pub fn setup_may_runtime() {
        MAY_INIT.call_once(|| {
            may::config().set_stack_size(TEST_STACK_SIZE);
        });
    }

    pub fn runtime() -> RuntimeConfig {
        RuntimeConfig {
            stack_size: TEST_STACK_SIZE,
        }
    }

    /// Running service on a random local port, stopped on drop.
    pub struct DogsTestServer {
        handle: Option<ServerHandle>,
        addr: SocketAddr,
        pub store: Arc<dyn DogStore>,
    }

    impl DogsTestServer {
        /// Default configuration over an empty in-memory store.
        pub fn new() -> Self {
            Self::with_config(AppConfig::default())
        }

        pub fn with_config(config: AppConfig) -> Self {
            Self::with_store(Arc::new(MemoryDogStore::new()), config)
        }

        pub fn with_store(store: Arc<dyn DogStore>, config: AppConfig) -> Self {
            setup_may_runtime();
            let service = app::build_service(Arc::clone(&store), &config, runtime())
                .expect("build service");

            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            let addr = listener.local_addr().unwrap();
            drop(listener);
            let handle = HttpServer(service).start(addr).unwrap();
            handle.wait_ready().unwrap();

            Self {
                handle: Some(handle),
                addr,
                store,
            }
        }

        pub fn addr(&self) -> SocketAddr {
            self.addr
        }

        /// Send one request and parse the reply.
        pub fn request(
            &self,
            method: &str,
            path: &str,
            body: Option<&str>,
        ) -> super::http::TestResponse {
            super::http::request(&self.addr, method, path, &[], body)
        }

        pub fn request_with_headers(
            &self,
            method: &str,
            path: &str,
            headers: &[(&str, &str)],
            body: Option<&str>,
        ) -> super::http::TestResponse {
            super::http::request(&self.addr, method, path, headers, body)
        }
    }

    impl Drop for DogsTestServer {
        fn drop(&mut self) {
            if let Some(handle) = self.handle.take() {
                handle.stop();
            }
        }
    }
}

pub mod http {
    use std::io::{Read, Write};
    use std::net::{SocketAddr, TcpStream};
    use std::time::Duration;

    #[derive(Debug)]
    pub struct TestResponse {
        pub status: u16,
        pub headers: Vec<(String, String)>,
        pub body: String,
    }

    impl TestResponse {
        pub fn header(&self, name: &str) -> Option<&str> {
            self.headers
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(name))
                .map(|(_, v)| v.as_str())
        }

        pub fn json(&self) -> serde_json::Value {
            serde_json::from_str(&self.body)
                .unwrap_or_else(|e| panic!("body is not JSON ({e}): {:?}", self.body))
        }
    }

    /// Build a raw HTTP/1.1 request.
    pub fn build_request(
        method: &str,
        path: &str,
        headers: &[(&str, &str)],
        body: Option<&str>,
    ) -> String {
        let mut req = format!("{method} {path} HTTP/1.1\r\nHost: localhost\r\n");
        for (name, value) in headers {
            req.push_str(&format!("{name}: {value}\r\n"));
        }
        if let Some(body) = body {
            req.push_str("Content-Type: application/json\r\n");
            req.push_str(&format!("Content-Length: {}\r\n", body.len()));
        }
        req.push_str("\r\n");
        if let Some(body) = body {
            req.push_str(body);
        }
        req
    }

    pub fn request(
        addr: &SocketAddr,
        method: &str,
        path: &str,
        headers: &[(&str, &str)],
        body: Option<&str>,
    ) -> TestResponse {
        parse_response(&send_request(
            addr,
            &build_request(method, path, headers, body),
        ))
    }

    /// Write `req` and read one response, honouring `Content-Length`.
    pub fn send_request(addr: &SocketAddr, req: &str) -> String {
        let mut stream = TcpStream::connect(addr).unwrap();
        stream.write_all(req.as_bytes()).unwrap();
        stream
            .set_read_timeout(Some(Duration::from_millis(500)))
            .unwrap();

        let mut buf = Vec::new();
        let mut header_end = None;
        for _ in 0..20 {
            let mut tmp = [0u8; 1024];
            match stream.read(&mut tmp) {
                Ok(0) => break,
                Ok(n) => {
                    buf.extend_from_slice(&tmp[..n]);
                    if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                        header_end = Some(pos + 4);
                        break;
                    }
                }
                Err(ref e)
                    if e.kind() == std::io::ErrorKind::WouldBlock
                        || e.kind() == std::io::ErrorKind::TimedOut =>
                {
                    continue;
                }
                Err(e) => panic!("read error: {:?}", e),
            }
        }

        let header_end = header_end.unwrap_or(buf.len());
        let headers = String::from_utf8_lossy(&buf[..header_end]).to_string();
        let content_length = headers
            .lines()
            .filter_map(|l| l.split_once(':'))
            .find(|(n, _)| n.trim().eq_ignore_ascii_case("content-length"))
            .and_then(|(_, v)| v.trim().parse::<usize>().ok());

        if let Some(clen) = content_length {
            while buf.len().saturating_sub(header_end) < clen {
                let mut tmp = [0u8; 4096];
                match stream.read(&mut tmp) {
                    Ok(0) => break,
                    Ok(n) => buf.extend_from_slice(&tmp[..n]),
                    Err(ref e)
                        if e.kind() == std::io::ErrorKind::WouldBlock
                            || e.kind() == std::io::ErrorKind::TimedOut =>
                    {
                        break;
                    }
                    Err(e) => panic!("read error: {:?}", e),
                }
            }
        }
        String::from_utf8_lossy(&buf).to_string()
    }

    pub fn parse_response(resp: &str) -> TestResponse {
        let (head, body) = resp.split_once("\r\n\r\n").unwrap_or((resp, ""));
        let mut lines = head.lines();
        let status = lines
            .next()
            .and_then(|l| l.split_whitespace().nth(1))
            .and_then(|s| s.parse().ok())
            .unwrap_or(0);
        let headers = lines
            .filter_map(|l| l.split_once(':'))
            .map(|(n, v)| (n.trim().to_string(), v.trim().to_string()))
            .collect();
        TestResponse {
            status,
            headers,
            body: body.to_string(),
        }
    }
}
