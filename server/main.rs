use actix_files::{Files, NamedFile};
use actix_web::dev::{fn_service, ServiceRequest, ServiceResponse};
use actix_web::http::{header, StatusCode};
use actix_web::{middleware, web, App, HttpRequest, HttpResponse, HttpServer};
use std::env;

const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:5001";
const DIST_DIR: &str = "./dist";

/// Upstream that serves the `/api` endpoints
struct Backend {
    client: reqwest::Client,
    base_url: String,
}

impl Backend {
    fn url_for(&self, req: &HttpRequest) -> String {
        let path = req.uri().path_and_query().map_or("/", |pq| pq.as_str());
        format!("{}{path}", self.base_url.trim_end_matches('/'))
    }
}

fn bad_gateway(message: String) -> HttpResponse {
    log::error!("{message}");
    HttpResponse::BadGateway().body(message)
}

async fn proxy_api(req: HttpRequest, body: web::Bytes, backend: web::Data<Backend>) -> HttpResponse {
    let Ok(method) = reqwest::Method::from_bytes(req.method().as_str().as_bytes()) else {
        return HttpResponse::MethodNotAllowed().finish();
    };
    let url = backend.url_for(&req);
    let mut upstream = backend.client.request(method, &url).body(body.to_vec());
    if let Some(content_type) = req.headers().get(header::CONTENT_TYPE).and_then(|v| v.to_str().ok()) {
        upstream = upstream.header(reqwest::header::CONTENT_TYPE, content_type);
    }

    let response = match upstream.send().await {
        Ok(response) => response,
        Err(e) => return bad_gateway(format!("Backend request to {url} failed: {e}")),
    };
    let status = StatusCode::from_u16(response.status().as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);
    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);

    match response.bytes().await {
        Ok(bytes) => {
            let mut builder = HttpResponse::build(status);
            if let Some(content_type) = content_type {
                builder.insert_header((header::CONTENT_TYPE, content_type));
            }
            builder.body(bytes)
        }
        Err(e) => bad_gateway(format!("Reading backend response from {url} failed: {e}")),
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let port = env::var("PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(8080);
    let backend_url = env::var("BACKEND_URL").unwrap_or_else(|_| DEFAULT_BACKEND_URL.to_string());

    log::info!("Starting server on 0.0.0.0:{port}, proxying /api to {backend_url}");

    let backend = web::Data::new(Backend { client: reqwest::Client::new(), base_url: backend_url });

    HttpServer::new(move || {
        App::new()
            .app_data(backend.clone())
            .wrap(middleware::Compress::default())
            .wrap(middleware::Logger::default())
            .service(web::scope("/api").default_service(web::to(proxy_api)))
            .service(
                Files::new("/", DIST_DIR)
                    .index_file("index.html")
                    // Client-side routes such as /problems get the app shell
                    .default_handler(fn_service(|req: ServiceRequest| async {
                        let (req, _) = req.into_parts();
                        let file = NamedFile::open_async(format!("{DIST_DIR}/index.html")).await?;
                        let res = file.into_response(&req);
                        Ok(ServiceResponse::new(req, res))
                    })),
            )
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await
}
