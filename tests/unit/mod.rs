mod router;
mod storage;
mod support;
mod validation;
