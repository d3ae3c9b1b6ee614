use super::ApiError;

pub fn validate_id(id: i32) -> Result<i32, ApiError> {
    if id <= 0 {
        return Err(ApiError::validation(format!(
            "Invalid id: {id}. Id must be a positive integer"
        )));
    }
    Ok(id)
}

pub fn validate_email(email: &str) -> Result<&str, ApiError> {
    let trimmed = email.trim();
    if trimmed.is_empty() {
        return Err(ApiError::validation("Email cannot be empty"));
    }

    if trimmed.len() > 254 {
        return Err(ApiError::validation("Email must be 254 characters or less"));
    }

    match trimmed.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(trimmed),
        _ => Err(ApiError::validation(format!("Invalid email: {trimmed}"))),
    }
}

pub fn validate_password(password: &str) -> Result<&str, ApiError> {
    if !(4..=72).contains(&password.len()) {
        return Err(ApiError::validation(
            "Password must be between 4 and 72 characters",
        ));
    }
    Ok(password)
}

pub fn validate_make_model(field: &str, value: &str) -> Result<(), ApiError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ApiError::validation(format!("{field} cannot be empty")));
    }
    if trimmed.len() > 100 {
        return Err(ApiError::validation(format!(
            "{field} must be 100 characters or less"
        )));
    }
    Ok(())
}

pub fn validate_year(year: i32) -> Result<i32, ApiError> {
    if !(1930..=2050).contains(&year) {
        return Err(ApiError::validation(format!(
            "Invalid year: {year}. Year must be between 1930 and 2050"
        )));
    }
    Ok(year)
}

pub fn validate_lat(lat: i32) -> Result<i32, ApiError> {
    if !(-90..=90).contains(&lat) {
        return Err(ApiError::validation(format!(
            "Invalid latitude: {lat}. Latitude must be between -90 and 90"
        )));
    }
    Ok(lat)
}

pub fn validate_lon(lon: i32) -> Result<i32, ApiError> {
    if !(-180..=180).contains(&lon) {
        return Err(ApiError::validation(format!(
            "Invalid longitude: {lon}. Longitude must be between -180 and 180"
        )));
    }
    Ok(lon)
}

pub fn validate_mileage(mileage: i32) -> Result<i32, ApiError> {
    if !(0..=1_000_000).contains(&mileage) {
        return Err(ApiError::validation(format!(
            "Invalid mileage: {mileage}. Mileage must be between 0 and 1000000"
        )));
    }
    Ok(mileage)
}

pub fn validate_price(price: i32) -> Result<i32, ApiError> {
    if !(0..=1_000_000).contains(&price) {
        return Err(ApiError::validation(format!(
            "Invalid price: {price}. Price must be between 0 and 1000000"
        )));
    }
    Ok(price)
}
