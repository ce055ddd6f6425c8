use utoipa::OpenApi;

use crate::dialog::{Notice, NoticeKind};
use crate::handlers::{CreateClassRequest, CreateClassResponse, NoticeResponse, SelectResponse};
use crate::models::{ClassRecord, StudentEntry};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::root,
        crate::handlers::healthz_live,
        crate::handlers::healthz_ready,
        crate::handlers::list_classes,
        crate::handlers::create_class,
        crate::handlers::delete_class,
        crate::handlers::select_class
    ),
    components(schemas(
        ClassRecord,
        StudentEntry,
        CreateClassRequest,
        CreateClassResponse,
        NoticeResponse,
        SelectResponse,
        Notice,
        NoticeKind
    )),
    tags(
        (name = "classes", description = "Class roster operations")
    ),
)]
pub struct ApiDoc;
